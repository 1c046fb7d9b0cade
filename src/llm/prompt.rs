//! Prompt construction for changelog generation.

use crate::git::RawCommit;

/// Fixed system instruction describing tone and structure of the output.
pub const SYSTEM_PROMPT: &str = "You are an expert analyst specializing in analyzing software changes and creating clear, user-focused changelogs. You excel at identifying patterns across commits, grouping related changes, and communicating technical updates in business-friendly language. Your changelogs are well-structured, emphasize user impact, and maintain professional tone.";

/// Build the user prompt embedding every commit in a fixed textual layout.
///
/// Commit text is sanitized first so a crafted commit message can't smuggle
/// instructions into the prompt.
pub fn build_prompt(commits: &[RawCommit]) -> String {
    let commit_details = commits
        .iter()
        .map(|commit| {
            format!(
                "Commit: {}\nAuthor: {}\nDate: {}\nSubject: {}\nBody: {}",
                commit.hash,
                sanitize_for_prompt(&commit.author),
                commit.date,
                sanitize_for_prompt(&commit.subject),
                sanitize_for_prompt(&commit.body),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r##"### INSTRUCTIONS ###
Create a professional changelog based on the git commits below. Your task is to analyze these commits and produce a well-organized, user-friendly changelog that follows the style of leading tech companies like Stripe and Vercel.

### KEY POINTS ###
- Include month/year heading and descriptive section headings
- Translate technical details into user benefits
- Use clear categories and consistent formatting
- Consolidate similar/small changes across multiple commits; skip trivial changes
- Some commits may be minor (typo fixes, small adjustments) and should be aggregated

### RESPONSE FORMAT ###
- Clean Markdown without emojis
- ## for category headings (New Features, Improvements, Bug Fixes, etc.)
- Bullet points with **bold** feature names
- Brief descriptions focused on user value
- Include step-by-step guides for major features
- IMPORTANT: Provide ONLY raw markdown with no commentary or code blocks.
- Start directly with "# Month Year" heading.

### COMMIT DETAILS ###
{commit_details}"##
    )
}

/// Neutralize prompt-injection vectors in commit text: code fences, heading
/// markers, and unbounded length.
pub fn sanitize_for_prompt(text: &str) -> String {
    text.replace("```", "'''")
        .replace("##", "//")
        .lines()
        .take(50)
        .collect::<Vec<_>>()
        .join("\n")
}

use crate::models::ProblemRecord;
use std::fmt::Write;

const INTRO: &str = "A startup has submitted the following idea:";
const PROBLEMS_HEADER: &str =
    "Here are real-world problems reported from different parts of the world:";
const INSTRUCTION: &str = "Rank the problems from most to least relevant based on how well the startup could help solve them. Return an ordered list with short reasoning.";

/// Render one problem as a numbered block (`index` is 1-based)
pub fn format_problem(index: usize, problem: &ProblemRecord) -> String {
    format!(
        "Problem {}:\nTitle: {}\nLocation: {}\nDescription: {}",
        index, problem.title, problem.location, problem.description
    )
}

/// Render all problems in fetch order, separated by a blank line
pub fn format_problems(problems: &[ProblemRecord]) -> String {
    problems
        .iter()
        .enumerate()
        .map(|(i, p)| format_problem(i + 1, p))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the ranking prompt for a startup description
///
/// Pure and deterministic: the same description and problem order always yield
/// the same string. With no problems the list section is simply empty.
pub fn build_prompt(description: &str, problems: &[ProblemRecord]) -> String {
    let mut prompt = String::with_capacity(512 + description.len() + problems.len() * 256);

    // Writing to a String cannot fail
    let _ = write!(
        prompt,
        "{INTRO}\n\"\"\"\n{description}\n\"\"\"\n\n{PROBLEMS_HEADER}\n\n{}\n\n{INSTRUCTION}",
        format_problems(problems)
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kenya() -> ProblemRecord {
        ProblemRecord::new(
            1,
            "No electricity access",
            "Villages have no grid connection",
            "Rural Kenya",
        )
    }

    #[test]
    fn test_format_problem_block() {
        assert_eq!(
            format_problem(1, &kenya()),
            "Problem 1:\nTitle: No electricity access\nLocation: Rural Kenya\nDescription: Villages have no grid connection"
        );
    }

    #[test]
    fn test_blocks_separated_by_blank_line() {
        let second = ProblemRecord::new(2, "Flooding", "Seasonal floods", "Dhaka");
        let blocks = format_problems(&[kenya(), second]);

        let parts: Vec<&str> = blocks.split("\n\n").collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("Problem 1:\nTitle: No electricity access"));
        assert!(parts[1].starts_with("Problem 2:\nTitle: Flooding"));
    }

    #[test]
    fn test_full_prompt_layout() {
        let prompt = build_prompt("We build solar micro-grids for rural villages", &[kenya()]);

        let expected = "A startup has submitted the following idea:\n\
\"\"\"\n\
We build solar micro-grids for rural villages\n\
\"\"\"\n\
\n\
Here are real-world problems reported from different parts of the world:\n\
\n\
Problem 1:\n\
Title: No electricity access\n\
Location: Rural Kenya\n\
Description: Villages have no grid connection\n\
\n\
Rank the problems from most to least relevant based on how well the startup could help solve them. Return an ordered list with short reasoning.";

        assert_eq!(prompt, expected);
    }

    #[test]
    fn test_empty_problem_list_is_well_formed() {
        let prompt = build_prompt("A marketplace for used textbooks", &[]);

        assert!(prompt.contains("\"\"\"\nA marketplace for used textbooks\n\"\"\""));
        assert!(!prompt.contains("Problem 1:"));
        assert!(prompt.ends_with(INSTRUCTION));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let problems = vec![kenya(), ProblemRecord::new("b", "Drought", "No rain", "Sahel")];
        assert_eq!(
            build_prompt("idea", &problems),
            build_prompt("idea", &problems)
        );
    }
}

// pagekeep/src/util/helper.rs
use std::io::{self, BufRead, Write};

/// Interactive confirmation prompt; anything but `y`/`yes` declines
pub fn confirm(prompt: &str) -> bool {
    confirm_from(prompt, &mut io::stdin().lock(), &mut io::stdout())
}

fn confirm_from(prompt: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    if write!(output, "{} (y/N): ", prompt)
        .and_then(|_| output.flush())
        .is_err()
    {
        return false;
    }

    let mut user_input = String::new();
    if input.read_line(&mut user_input).is_err() {
        return false;
    }
    matches!(user_input.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("y\n", true)]
    #[case("YES\n", true)]
    #[case("n\n", false)]
    #[case("\n", false)]
    #[case("", false)]
    fn given_answer_when_confirming_then_only_yes_accepts(#[case] answer: &str, #[case] expected: bool) {
        let mut output = Vec::new();
        let confirmed = confirm_from("Delete?", &mut answer.as_bytes(), &mut output);

        assert_eq!(confirmed, expected);
        assert_eq!(String::from_utf8(output).unwrap(), "Delete? (y/N): ");
    }
}

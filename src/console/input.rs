//! Typed prompts that keep asking until the answer parses.
//!
//! Every helper returns `Ok(None)` when input runs out.

use std::io;

use super::Console;

impl Console {
    pub fn read_int(&mut self, prompt: &str) -> io::Result<Option<i64>> {
        loop {
            let Some(answer) = self.prompt(prompt)? else {
                return Ok(None);
            };
            match answer.trim().parse::<i64>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => self
                    .printer
                    .error("Invalid input. Please enter an integer.")?,
            }
        }
    }

    pub fn read_yes_no(&mut self, prompt: &str) -> io::Result<Option<bool>> {
        let prompt = format!("{prompt} (y/n): ");
        loop {
            let Some(answer) = self.prompt(&prompt)? else {
                return Ok(None);
            };
            match answer.trim().to_lowercase().as_str() {
                "y" | "yes" => return Ok(Some(true)),
                "n" | "no" => return Ok(Some(false)),
                _ => self.printer.error("Invalid input. Please enter 'y' or 'n'.")?,
            }
        }
    }

    /// Splits the answer on commas and trims each item. With `valid_values`,
    /// every item must be one of them.
    pub fn read_comma_separated(
        &mut self,
        prompt: &str,
        valid_values: Option<&[&str]>,
    ) -> io::Result<Option<Vec<String>>> {
        loop {
            let Some(answer) = self.prompt(prompt)? else {
                return Ok(None);
            };
            let items: Vec<String> = answer.split(',').map(|s| s.trim().to_string()).collect();
            match valid_values {
                Some(valid) if !items.iter().all(|item| valid.contains(&item.as_str())) => {
                    self.printer.error(&format!(
                        "Invalid input. Please enter a comma-separated list of values from {}.",
                        valid.join(", ")
                    ))?;
                }
                _ => return Ok(Some(items)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::scripted_console;

    #[test]
    fn test_read_int_reprompts() {
        let (mut console, transcript) = scripted_console(&["ten", " 10 "]);
        assert_eq!(console.read_int("Reference space id: ").unwrap(), Some(10));
        assert!(transcript.contents().contains("Please enter an integer"));
    }

    #[test]
    fn test_read_int_end_of_input() {
        let (mut console, _) = scripted_console(&["nope"]);
        assert_eq!(console.read_int("id: ").unwrap(), None);
    }

    #[test]
    fn test_read_yes_no() {
        let (mut console, transcript) = scripted_console(&["maybe", "YES", "n"]);
        assert_eq!(console.read_yes_no("Continue?").unwrap(), Some(true));
        assert_eq!(console.read_yes_no("Continue?").unwrap(), Some(false));
        let out = transcript.contents();
        assert!(out.contains("Continue? (y/n): "));
        assert!(out.contains("Please enter 'y' or 'n'"));
    }

    #[test]
    fn test_read_comma_separated_validates() {
        let (mut console, transcript) = scripted_console(&["energy, volume", "energy , density"]);
        let valid = ["energy", "density", "intensity"];
        let items = console
            .read_comma_separated("Measurements: ", Some(&valid))
            .unwrap();
        assert_eq!(items, Some(vec!["energy".to_string(), "density".to_string()]));
        assert!(transcript.contents().contains("energy, density, intensity"));
    }

    #[test]
    fn test_read_comma_separated_unvalidated() {
        let (mut console, _) = scripted_console(&["a,b ,c"]);
        let items = console.read_comma_separated("Items: ", None).unwrap();
        assert_eq!(items, Some(vec!["a".into(), "b".into(), "c".into()]));
    }
}

//! Boundary between pipeline logic and the human operator.

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, MultiSelect, Select};

/// Questions the pipeline can ask a human
pub trait Interaction {
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;

    /// Pick any number of items; returns indices in ascending order
    fn select_many(&mut self, prompt: &str, items: &[String], defaults: &[bool])
    -> Result<Vec<usize>>;

    fn select_one(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize>;

    /// Free text; may be empty
    fn input(&mut self, prompt: &str) -> Result<String>;
}

/// Terminal prompts via dialoguer
pub struct DialoguerInteraction {
    theme: ColorfulTheme,
}

impl DialoguerInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction for DialoguerInteraction {
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }

    fn select_many(
        &mut self,
        prompt: &str,
        items: &[String],
        defaults: &[bool],
    ) -> Result<Vec<usize>> {
        let mut chosen = MultiSelect::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .defaults(defaults)
            .interact()?;
        chosen.sort_unstable();
        Ok(chosen)
    }

    fn select_one(&mut self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()?)
    }

    fn input(&mut self, prompt: &str) -> Result<String> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?)
    }
}

/// Answers every question with its default and selects everything offered
#[derive(Debug, Default)]
pub struct AcceptAll;

impl Interaction for AcceptAll {
    fn confirm(&mut self, _prompt: &str, _default: bool) -> Result<bool> {
        Ok(true)
    }

    fn select_many(
        &mut self,
        _prompt: &str,
        items: &[String],
        _defaults: &[bool],
    ) -> Result<Vec<usize>> {
        Ok((0..items.len()).collect())
    }

    fn select_one(&mut self, _prompt: &str, _items: &[String], default: usize) -> Result<usize> {
        Ok(default)
    }

    fn input(&mut self, _prompt: &str) -> Result<String> {
        Ok(String::new())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// One scripted answer
    #[derive(Debug, Clone)]
    pub(crate) enum Answer {
        Confirm(bool),
        Many(Vec<usize>),
        One(usize),
        Text(String),
    }

    /// Replays answers in order; fails on a question of the wrong kind
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedInteraction {
        answers: VecDeque<Answer>,
        pub prompts: Vec<String>,
    }

    impl ScriptedInteraction {
        pub fn new(answers: Vec<Answer>) -> Self {
            Self {
                answers: answers.into(),
                prompts: Vec::new(),
            }
        }

        pub fn is_exhausted(&self) -> bool {
            self.answers.is_empty()
        }

        fn next(&mut self, prompt: &str) -> Result<Answer> {
            self.prompts.push(prompt.to_string());
            self.answers
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no scripted answer for '{prompt}'"))
        }
    }

    impl Interaction for ScriptedInteraction {
        fn confirm(&mut self, prompt: &str, _default: bool) -> Result<bool> {
            match self.next(prompt)? {
                Answer::Confirm(b) => Ok(b),
                other => anyhow::bail!("expected confirm for '{prompt}', got {other:?}"),
            }
        }

        fn select_many(
            &mut self,
            prompt: &str,
            _items: &[String],
            _defaults: &[bool],
        ) -> Result<Vec<usize>> {
            match self.next(prompt)? {
                Answer::Many(v) => Ok(v),
                other => anyhow::bail!("expected multi-select for '{prompt}', got {other:?}"),
            }
        }

        fn select_one(&mut self, prompt: &str, _items: &[String], _default: usize) -> Result<usize> {
            match self.next(prompt)? {
                Answer::One(i) => Ok(i),
                other => anyhow::bail!("expected select for '{prompt}', got {other:?}"),
            }
        }

        fn input(&mut self, prompt: &str) -> Result<String> {
            match self.next(prompt)? {
                Answer::Text(s) => Ok(s),
                other => anyhow::bail!("expected text for '{prompt}', got {other:?}"),
            }
        }
    }

    #[test]
    fn test_accept_all_selects_everything() {
        let mut accept = AcceptAll;
        let items = vec!["a".to_string(), "b".to_string()];
        assert_eq!(accept.select_many("p", &items, &[false, false]).unwrap(), [0, 1]);
        assert_eq!(accept.select_one("p", &items, 1).unwrap(), 1);
        assert!(accept.confirm("p", false).unwrap());
        assert_eq!(accept.input("p").unwrap(), "");
    }
}

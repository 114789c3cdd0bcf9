use crate::event::{tokenize, Event};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestRoster {
    /// Display name, empty when the page carries no contest link
    pub name: String,
    pub problems: Vec<ProblemRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRef {
    pub letter: String,
    pub title: String,
}

/// Event consumer for a contest index page.
///
/// The contest name comes from the black `<a>` linking back to the contest;
/// problems come from the `<option>` entries of the problem selector.
#[derive(Debug)]
pub struct RosterExtractor {
    contest_href: String,
    capturing_name: bool,
    capturing_problem: bool,
    name: Option<String>,
    title: String,
    letters: Vec<String>,
    titles: Vec<String>,
}

impl RosterExtractor {
    pub fn new(contest: &str) -> Self {
        Self {
            contest_href: format!("/contest/{}", contest),
            capturing_name: false,
            capturing_problem: false,
            name: None,
            title: String::new(),
            letters: vec![],
            titles: vec![],
        }
    }

    pub fn step(&mut self, event: &Event) {
        match event {
            Event::StartTag { name, attrs } => {
                if name == "a" && self.name.is_none() && self.is_contest_link(attrs) {
                    self.capturing_name = true;
                } else if name == "option" {
                    if let [(_, value)] = attrs.as_slice() {
                        if let Some(letter) = problem_letter(value) {
                            self.letters.push(letter.to_string());
                            self.capturing_problem = true;
                        }
                    }
                }
            }
            Event::Text(data) => {
                if self.capturing_name {
                    self.name = Some(data.clone());
                } else if self.capturing_problem {
                    self.title.push_str(data);
                }
            }
            Event::EndTag { name } => {
                if name == "a" && self.capturing_name {
                    self.capturing_name = false;
                } else if self.capturing_problem {
                    self.titles.push(std::mem::take(&mut self.title));
                    self.capturing_problem = false;
                }
            }
            Event::EntityRef(_) => {}
        }
    }

    /// Pairs letters with titles; a title cut off by the end of the page is dropped.
    pub fn finish(self) -> ContestRoster {
        let problems = self
            .letters
            .into_iter()
            .zip(self.titles)
            .map(|(letter, title)| ProblemRef { letter, title })
            .collect();

        ContestRoster {
            name: self.name.unwrap_or_default(),
            problems,
        }
    }

    fn is_contest_link(&self, attrs: &[(String, String)]) -> bool {
        match attrs {
            [(style_key, style), (href_key, href)] => {
                style_key == "style"
                    && style == "color: black"
                    && href_key == "href"
                    && *href == self.contest_href
            }
            _ => false,
        }
    }
}

/// Matches a problem code: one uppercase letter, optionally one digit.
pub fn problem_letter(value: &str) -> Option<&str> {
    let mut chars = value.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(l), None, None) if l.is_ascii_uppercase() => Some(value),
        (Some(l), Some(d), None) if l.is_ascii_uppercase() && d.is_ascii_digit() => Some(value),
        _ => None,
    }
}

/// Extracts the contest name and problem list from a contest page.
pub fn extract_roster(contest: &str, html: &str) -> ContestRoster {
    let mut extractor = RosterExtractor::new(contest);
    let events = tokenize(html);
    for event in &events {
        extractor.step(event);
    }

    let roster = extractor.finish();
    debug!(
        events = events.len(),
        problems = roster.problems.len(),
        "extracted roster"
    );
    roster
}

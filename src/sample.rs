use crate::event::{decode_entity, tokenize, Event};
use crate::{ExtractError, ExtractResult};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Input,
    Output,
}

/// One sample test block from a problem page.
///
/// `index` is 1-based; output `N` belongs to input `N`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub kind: SampleKind,
    pub index: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    AwaitingPreformatted(Sample),
    Copying {
        sample: Sample,
        pending_newline: bool,
    },
}

/// State machine recovering sample tests from a problem page.
///
/// Samples live in `<div class="input">` / `<div class="output">` wrappers
/// around a single `<pre>`, with lines separated by `<br>` tags. Input and
/// output share one counter: an output block takes the index of the most
/// recent input block.
#[derive(Debug, Default)]
pub struct SampleExtractor {
    state: State,
    inputs: usize,
}

impl Sample {
    fn open(kind: SampleKind, index: usize) -> Self {
        Self {
            kind,
            index,
            bytes: vec![],
        }
    }
}

impl SampleExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one event, returning the sample it completes, if any.
    pub fn step(&mut self, event: &Event) -> ExtractResult<Option<Sample>> {
        let state = std::mem::take(&mut self.state);
        let (state, done) = self.transition(state, event)?;
        self.state = state;
        Ok(done)
    }

    /// Runs a whole page; a block still open at the end is dropped.
    pub fn extract<'a>(
        mut self,
        events: impl IntoIterator<Item = &'a Event>,
    ) -> ExtractResult<Vec<Sample>> {
        let mut samples = vec![];
        for event in events {
            if let Some(sample) = self.step(event)? {
                samples.push(sample);
            }
        }
        Ok(samples)
    }

    fn transition(&mut self, state: State, event: &Event) -> ExtractResult<(State, Option<Sample>)> {
        let next = match (state, event) {
            // a new sample div drops a block whose <pre> never arrived
            (
                state @ (State::Idle | State::AwaitingPreformatted(_)),
                Event::StartTag { name, attrs },
            ) if name == "div" => {
                match sample_class(attrs) {
                    Some(SampleKind::Input) => {
                        self.inputs += 1;
                        State::AwaitingPreformatted(Sample::open(SampleKind::Input, self.inputs))
                    }
                    Some(SampleKind::Output) => {
                        if self.inputs == 0 {
                            return Err(ExtractError::OutputBeforeInput);
                        }
                        State::AwaitingPreformatted(Sample::open(SampleKind::Output, self.inputs))
                    }
                    None => state,
                }
            }
            (State::AwaitingPreformatted(sample), Event::StartTag { name, .. }) if name == "pre" => {
                State::Copying {
                    sample,
                    pending_newline: false,
                }
            }
            (State::Copying { mut sample, .. }, Event::Text(data)) => {
                sample
                    .bytes
                    .extend_from_slice(data.trim_matches('\n').as_bytes());
                State::Copying {
                    sample,
                    pending_newline: false,
                }
            }
            (
                State::Copying {
                    mut sample,
                    pending_newline,
                },
                Event::EntityRef(name),
            ) => {
                sample.bytes.extend_from_slice(decode_entity(name).as_bytes());
                State::Copying {
                    sample,
                    pending_newline,
                }
            }
            (State::Copying { mut sample, .. }, Event::EndTag { name }) if name == "br" => {
                sample.bytes.push(b'\n');
                State::Copying {
                    sample,
                    pending_newline: true,
                }
            }
            (
                State::Copying {
                    mut sample,
                    pending_newline,
                },
                Event::EndTag { name },
            ) if name == "pre" => {
                if !pending_newline {
                    sample.bytes.push(b'\n');
                }
                return Ok((State::Idle, Some(sample)));
            }
            (state, _) => state,
        };

        Ok((next, None))
    }
}

fn sample_class(attrs: &[(String, String)]) -> Option<SampleKind> {
    match attrs {
        [(key, value)] if key == "class" => match value.as_str() {
            "input" => Some(SampleKind::Input),
            "output" => Some(SampleKind::Output),
            _ => None,
        },
        _ => None,
    }
}

/// Extracts every sample test from a problem page, in document order.
pub fn extract_samples(html: &str) -> ExtractResult<Vec<Sample>> {
    let events = tokenize(html);
    let samples = SampleExtractor::new().extract(&events)?;
    debug!(
        events = events.len(),
        samples = samples.len(),
        "extracted samples"
    );
    Ok(samples)
}

//! Static view of how the fuser groups a step list.

use std::fmt;

use serde::Serialize;

use pipefuse_core::step::{run_len, Step};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    /// A step applied to the whole value.
    Eager { index: usize, name: &'static str },
    /// Steps sharing one traversal of a sequence input.
    Fused {
        start: usize,
        names: Vec<&'static str>,
        terminal: bool,
    },
}

/// Group `steps` the way the runtime does when its input is a sequence.
pub fn explain(steps: &[Step]) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < steps.len() {
        let len = run_len(steps, i);
        if len == 0 {
            out.push(Segment::Eager {
                index: i,
                name: steps[i].name(),
            });
            i += 1;
            continue;
        }
        let run = &steps[i..i + len];
        out.push(Segment::Fused {
            start: i,
            names: run.iter().map(Step::name).collect(),
            terminal: run[len - 1].is_terminal(),
        });
        i += len;
    }
    out
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Eager { index, name } => write!(f, "[{index}] eager {name}"),
            Segment::Fused {
                start,
                names,
                terminal,
            } => {
                write!(f, "[{start}] fused {}", names.join(" → "))?;
                if *terminal {
                    write!(f, " (terminal)")?;
                }
                Ok(())
            }
        }
    }
}

//! The line-reflow engine: a best-first search over break/no-break decisions
//! for one logical line. The search minimizes total penalty under the column
//! limit; ties resolve deterministically toward earlier breaks.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use pyfmt_style::Style;
use pyfmt_syntax::LogicalLine;
use rustc_hash::{FxHashSet, FxHasher};

use crate::error::{FormatError, FormatResult};

mod state;

use state::{FormatDecisionState, Reflow};

/// Placement instruction for one token of a reflowed line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderedToken {
    /// True when a line break goes before this token.
    pub newline: bool,
    /// Spaces before the token when it stays on the current line.
    pub spaces: u32,
    /// Column the token starts at, used for continuation indentation.
    pub start_column: u32,
}

/// Choose the cheapest legal layout for one logical line and return the
/// per-token placement instructions.
pub fn reflow_line(line: &LogicalLine, style: &Style) -> FormatResult<Vec<RenderedToken>> {
    let indent = line.depth as u32 * style.indent_width;
    if !line.has_forced_break() && line.single_line_width(indent) <= style.column_limit {
        return Ok(render(line, style, &vec![false; line.tokens.len()]));
    }
    let decisions = search(line, style)?;
    Ok(render(line, style, &decisions))
}

struct SearchNode {
    state: FormatDecisionState,
    parent: Option<Rc<SearchNode>>,
    newline: bool,
}

struct QueueEntry {
    cost: u64,
    /// Monotonic insertion counter. Among equal costs the entry pushed
    /// first wins, and break-branches are pushed before no-break branches,
    /// which prefers earlier breaks and then fewer breaks.
    seq: u64,
    node: Rc<SearchNode>,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.seq == other.seq
    }
}
impl Eq for QueueEntry {}
impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost.cmp(&other.cost).then(self.seq.cmp(&other.seq))
    }
}

fn fingerprint(state: &FormatDecisionState) -> u64 {
    let mut hasher = FxHasher::default();
    state.hash(&mut hasher);
    hasher.finish()
}

fn search(line: &LogicalLine, style: &Style) -> FormatResult<Vec<bool>> {
    let engine = Reflow::new(line, style);
    let token_count = engine.token_count();

    let mut heap: BinaryHeap<Reverse<QueueEntry>> = BinaryHeap::new();
    let mut visited: FxHashSet<u64> = FxHashSet::default();
    let mut seq = 0u64;

    let mut initial = engine.fresh_state();
    let initial_cost = engine.place_token(&mut initial, false);
    heap.push(Reverse(QueueEntry {
        cost: initial_cost,
        seq,
        node: Rc::new(SearchNode {
            state: initial,
            parent: None,
            newline: false,
        }),
    }));

    while let Some(Reverse(entry)) = heap.pop() {
        if entry.node.state.next_token == token_count {
            return Ok(reconstruct(&entry.node, token_count));
        }
        if !visited.insert(fingerprint(&entry.node.state)) {
            continue;
        }

        let must = engine.must_split(&entry.node.state);
        let can = engine.can_split(&entry.node.state);

        if must || can {
            let mut next = entry.node.state.clone();
            let penalty = engine.place_token(&mut next, true);
            seq += 1;
            heap.push(Reverse(QueueEntry {
                cost: entry.cost + penalty,
                seq,
                node: Rc::new(SearchNode {
                    state: next,
                    parent: Some(Rc::clone(&entry.node)),
                    newline: true,
                }),
            }));
        }
        if !must {
            let mut next = entry.node.state.clone();
            let penalty = engine.place_token(&mut next, false);
            seq += 1;
            heap.push(Reverse(QueueEntry {
                cost: entry.cost + penalty,
                seq,
                node: Rc::new(SearchNode {
                    state: next,
                    parent: Some(Rc::clone(&entry.node)),
                    newline: false,
                }),
            }));
        }
    }

    Err(FormatError::InternalInvariant {
        line: line.first().original_line,
    })
}

fn reconstruct(terminal: &Rc<SearchNode>, token_count: usize) -> Vec<bool> {
    let mut decisions = vec![false; token_count];
    let mut node = Some(terminal);
    while let Some(current) = node {
        let placed = current.state.next_token - 1;
        decisions[placed] = current.newline;
        node = current.parent.as_ref();
    }
    decisions
}

/// Replay the winning decisions through the same transition function to
/// produce concrete columns and spacing for the emitter.
fn render(line: &LogicalLine, style: &Style, decisions: &[bool]) -> Vec<RenderedToken> {
    let engine = Reflow::new(line, style);
    let mut state = engine.fresh_state();
    let mut rendered = Vec::with_capacity(decisions.len());

    for (index, &newline) in decisions.iter().enumerate() {
        let (spaces, start_column) = if index == 0 {
            (0, state.column)
        } else if newline {
            (0, engine.newline_column(&state))
        } else {
            let spaces = engine.spaces_before(state.column, index);
            (spaces, state.column + spaces)
        };
        engine.place_token(&mut state, newline);
        rendered.push(RenderedToken {
            newline,
            spaces,
            start_column,
        });
    }
    rendered
}

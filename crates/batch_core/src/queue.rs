use std::collections::{HashSet, VecDeque};

use batch_logging::{batch_debug, batch_warn};
use serde::Deserialize;

use crate::{ItemId, WorkItem};

/// How the work queue tracks which rows remain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum QueueStrategy {
    /// Re-scan the live rows every step and skip ids already processed.
    /// Rows added mid-run are picked up; removed rows are simply absent.
    #[default]
    LiveDedup,
    /// Capture eligible rows once at start and pop them in page order,
    /// re-validating each against the live rows before use.
    SnapshotStack,
}

/// The row chosen by one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Selection {
    pub id: ItemId,
    pub actionable: bool,
}

/// What one step gets from the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Next {
    Row(Selection),
    /// Only rows requeued by this call remain; look again on a later step.
    Deferred,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StackEntry {
    id: ItemId,
    requeued: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) enum WorkQueue {
    #[default]
    Empty,
    LiveDedup {
        processed: HashSet<ItemId>,
    },
    SnapshotStack {
        // Back of the deque is the top of the stack.
        stack: VecDeque<StackEntry>,
    },
}

impl WorkQueue {
    pub fn build(strategy: QueueStrategy, items: &[WorkItem]) -> Self {
        match strategy {
            QueueStrategy::LiveDedup => Self::LiveDedup {
                processed: HashSet::new(),
            },
            QueueStrategy::SnapshotStack => {
                let stack = items
                    .iter()
                    .filter_map(WorkItem::eligible_id)
                    .rev()
                    .map(|id| StackEntry {
                        id: id.clone(),
                        requeued: false,
                    })
                    .collect();
                Self::SnapshotStack { stack }
            }
        }
    }

    /// Take the next row to process, judged against the current live rows.
    pub fn next(&mut self, items: &[WorkItem]) -> Next {
        match self {
            Self::Empty => Next::Exhausted,
            Self::LiveDedup { processed } => {
                next_unprocessed(processed, items).map_or(Next::Exhausted, Next::Row)
            }
            Self::SnapshotStack { stack } => pop_valid(stack, items),
        }
    }
}

fn next_unprocessed(processed: &mut HashSet<ItemId>, items: &[WorkItem]) -> Option<Selection> {
    for item in items.iter().filter(|item| item.eligible) {
        let Some(id) = &item.id else {
            batch_debug!("Skipping row without a parsable id");
            continue;
        };
        if processed.insert(id.clone()) {
            return Some(Selection {
                id: id.clone(),
                actionable: item.actionable,
            });
        }
    }
    None
}

fn pop_valid(stack: &mut VecDeque<StackEntry>, items: &[WorkItem]) -> Next {
    // Requeued entries go to the bottom, so once only they are left every
    // entry this call started with has been checked.
    let mut deferred = 0;
    while stack.len() > deferred {
        let Some(entry) = stack.pop_back() else {
            break;
        };
        let live = items
            .iter()
            .find(|item| item.eligible_id() == Some(&entry.id));
        if let Some(item) = live {
            return Next::Row(Selection {
                id: entry.id,
                actionable: item.actionable,
            });
        }
        if entry.requeued {
            batch_warn!("Row {} is still not eligible, dropping it", entry.id);
        } else {
            batch_debug!("Row {} is not eligible right now, requeueing once", entry.id);
            stack.push_front(StackEntry {
                id: entry.id,
                requeued: true,
            });
            deferred += 1;
        }
    }
    if deferred > 0 {
        Next::Deferred
    } else {
        Next::Exhausted
    }
}

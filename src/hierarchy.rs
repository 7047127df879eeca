// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Rebuild the parent/child ticket forest from flat parent references, and flatten it back
// role: hierarchy/forest
// inputs: Flat Vec<Ticket> in tracker order
// outputs: Roots with nested children (sibling order = input order); or a pre-order flat list
// invariants:
// - Tickets move into the forest; none are cloned
// - A parent missing from the batch makes the ticket a pseudo-root; a self-parent makes it a root
// - Members of a parent cycle that never reaches a root are not emitted
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::HashMap;

use crate::model::Ticket;

pub fn build_forest(tickets: Vec<Ticket>) -> Vec<Ticket> {
  let index: HashMap<u64, usize> = tickets.iter().enumerate().map(|(pos, t)| (t.id, pos)).collect();

  let mut roots: Vec<usize> = Vec::new();
  let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); tickets.len()];
  for (pos, t) in tickets.iter().enumerate() {
    match t.parent_id().and_then(|pid| index.get(&pid).copied()) {
      Some(parent) if parent != pos && tickets[parent].id != t.id => children_of[parent].push(pos),
      _ => roots.push(pos),
    }
  }

  let mut slots: Vec<Option<Ticket>> = tickets.into_iter().map(Some).collect();
  roots.into_iter().filter_map(|pos| assemble(pos, &mut slots, &children_of)).collect()
}

/// Attach every descendant of `root`. Walks with an explicit stack so depth is not bounded by the call stack.
fn assemble(root: usize, slots: &mut [Option<Ticket>], children_of: &[Vec<usize>]) -> Option<Ticket> {
  let mut preorder = Vec::new();
  let mut pending = vec![root];
  while let Some(pos) = pending.pop() {
    preorder.push(pos);
    pending.extend(children_of[pos].iter().copied());
  }

  // reverse pre-order finishes every child before its parent
  for &pos in preorder.iter().rev() {
    let children: Vec<Ticket> = children_of[pos].iter().filter_map(|&c| slots[c].take()).collect();
    if let Some(ticket) = slots[pos].as_mut() {
      ticket.children = children;
    }
  }
  slots[root].take()
}

/// Pre-order walk with every ticket's children detached.
pub fn flatten_forest(roots: Vec<Ticket>) -> Vec<Ticket> {
  let mut out = Vec::new();
  let mut pending: Vec<Ticket> = roots.into_iter().rev().collect();
  while let Some(mut ticket) = pending.pop() {
    let children = std::mem::take(&mut ticket.children);
    out.push(ticket);
    pending.extend(children.into_iter().rev());
  }
  out
}

/// Total tickets in a forest, descendants included.
pub fn count_tickets(roots: &[Ticket]) -> usize {
  let mut pending: Vec<&Ticket> = roots.iter().collect();
  let mut count = 0;
  while let Some(t) = pending.pop() {
    count += 1;
    pending.extend(&t.children);
  }
  count
}

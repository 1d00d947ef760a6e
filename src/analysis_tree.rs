// Tree of explored lines for reviewing a bughouse game.
//
// Nodes live in an arena keyed by `NodeId`. Ids are issued monotonically and never reused.
// Parent and child links are ids, so the arena is the only owner of nodes.
//
// Every node except the root stores the turn that leads to it from its parent and the position
// after that turn. Positions are only ever produced by applying the turn to the parent position.

use std::collections::HashMap;
use std::fmt;

use log::{info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::board::{Reserve, TurnError};
use crate::error::{ApplyTurnError, LoadError, TreeError};
use crate::fen::board_to_fen;
use crate::game::{
    BughouseBoard, BughouseGameStatus, BughousePlayerId, BughousePosition, BughouseTurn, Team,
    TurnApplied,
};
use crate::internal_error_message;
use crate::merge::{TurnRecord, apply_record, merge_turn_streams};
use crate::piece::PieceKind;
use crate::rules::Rules;


#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct NodeTurn {
    pub turn: BughouseTurn,
    pub player: BughousePlayerId,
    // Short algebraic with a bughouse check mark.
    pub notation: String,
    pub captured: Option<PieceKind>,
    // Set for turns that come from a game record.
    pub timestamp_millis: Option<u64>,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct AnalysisNode {
    id: NodeId,
    parent: Option<NodeId>,
    incoming_turn: Option<NodeTurn>,
    main_child: Option<NodeId>,
    children: Vec<NodeId>,
    position: BughousePosition,
}

impl AnalysisNode {
    pub fn id(&self) -> NodeId { self.id }
    pub fn parent(&self) -> Option<NodeId> { self.parent }
    pub fn incoming_turn(&self) -> Option<&NodeTurn> { self.incoming_turn.as_ref() }
    pub fn main_child(&self) -> Option<NodeId> { self.main_child }
    pub fn children(&self) -> &[NodeId] { &self.children }
    pub fn position(&self) -> &BughousePosition { &self.position }

    pub fn fen(&self, board_idx: BughouseBoard) -> String {
        board_to_fen(self.position.board(board_idx))
    }
    pub fn reserve(&self, team: Team, board_idx: BughouseBoard) -> &Reserve {
        self.position.reserve(team, board_idx)
    }
}

// Result of trying to go one step forward from the cursor.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NavForward {
    Advanced(NodeId),
    // The caller should let the user choose. The cursor is not moved.
    AmbiguousChildren(Vec<NodeId>),
    NoContinuation,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct AnalysisTree {
    rules: Rules,
    root: NodeId,
    nodes: HashMap<NodeId, AnalysisNode>,
    next_id: u64,
    cursor: NodeId,
    selected: NodeId,
    // Node whose recorded time is shown as the current game time. Follows the cursor along the
    // mainline and stays put while the cursor explores variations.
    clock_anchor: NodeId,
}

impl AnalysisTree {
    pub fn new(rules: Rules) -> Self {
        let root = NodeId(0);
        let root_node = AnalysisNode {
            id: root,
            parent: None,
            incoming_turn: None,
            main_child: None,
            children: Vec::new(),
            position: BughousePosition::new(),
        };
        AnalysisTree {
            rules,
            root,
            nodes: HashMap::from([(root, root_node)]),
            next_id: 1,
            cursor: root,
            selected: root,
            clock_anchor: root,
        }
    }

    // Merges per-board records of a game and builds a tree with the result as the mainline.
    pub fn load_game(
        rules: Rules, board_a: &[TurnRecord], board_b: &[TurnRecord],
    ) -> Result<Self, LoadError> {
        let records = merge_turn_streams(board_a, board_b, &rules)?;
        let mut tree = Self::new(rules);
        tree.load_mainline(&records)?;
        Ok(tree)
    }

    pub fn rules(&self) -> &Rules { &self.rules }
    pub fn root(&self) -> NodeId { self.root }
    pub fn cursor(&self) -> NodeId { self.cursor }
    pub fn selected(&self) -> NodeId { self.selected }
    pub fn clock_anchor(&self) -> NodeId { self.clock_anchor }
    pub fn num_nodes(&self) -> usize { self.nodes.len() }
    pub fn node(&self, id: NodeId) -> Option<&AnalysisNode> { self.nodes.get(&id) }
    pub fn nodes(&self) -> impl Iterator<Item = &AnalysisNode> { self.nodes.values() }

    pub fn cursor_node(&self) -> &AnalysisNode { self.existing(self.cursor) }

    // Recorded time of the clock anchor turn, if it has one.
    pub fn clock_time_millis(&self) -> Option<u64> {
        self.existing(self.clock_anchor).incoming_turn.as_ref()?.timestamp_millis
    }

    fn get(&self, id: NodeId) -> Result<&AnalysisNode, TreeError> {
        self.nodes.get(&id).ok_or(TreeError::UnknownNode(id))
    }

    // For ids that the tree itself keeps (root, cursor, links between nodes).
    fn existing(&self, id: NodeId) -> &AnalysisNode {
        match self.nodes.get(&id) {
            Some(node) => node,
            None => panic!("{}", internal_error_message!("node {id} is missing")),
        }
    }
    fn existing_mut(&mut self, id: NodeId) -> &mut AnalysisNode {
        match self.nodes.get_mut(&id) {
            Some(node) => node,
            None => panic!("{}", internal_error_message!("node {id} is missing")),
        }
    }

    // Whether the node is reached from the root by following main children only.
    pub fn is_on_mainline(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            let Some(node) = self.nodes.get(&current) else {
                return false;
            };
            let Some(parent) = node.parent else {
                return current == self.root;
            };
            if self.existing(parent).main_child != Some(current) {
                return false;
            }
            current = parent;
        }
    }

    pub fn mainline(&self) -> Vec<NodeId> {
        let mut line = vec![self.root];
        let mut current = self.root;
        while let Some(child) = self.existing(current).main_child {
            line.push(child);
            current = child;
        }
        line
    }

    pub fn path_from_root(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut path = vec![id];
        let mut current = self.get(id)?;
        while let Some(parent) = current.parent {
            path.push(parent);
            current = self.existing(parent);
        }
        path.reverse();
        Ok(path)
    }

    // Replaces everything below the root with the given turn sequence. Records must already be
    // in a replayable order (see `merge_turn_streams`). On failure the tree is not changed.
    pub fn load_mainline(&mut self, records: &[TurnRecord]) -> Result<(), LoadError> {
        let mut position = self.existing(self.root).position.clone();
        let mut applied_turns = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let applied = apply_record(&position, record, &self.rules).map_err(|error| {
                let err = LoadError::IllegalTurn { index, record: record.clone(), error };
                warn!("Rejecting mainline: {err}");
                err
            })?;
            position = applied.position.clone();
            applied_turns.push((applied, record.timestamp_millis));
        }

        let root = self.root;
        for child in std::mem::take(&mut self.existing_mut(root).children) {
            self.remove_subtree(child);
        }
        self.existing_mut(root).main_child = None;
        let mut parent = root;
        for (applied, timestamp_millis) in applied_turns {
            let id = self.add_child(parent, applied, Some(timestamp_millis));
            parent = id;
        }
        self.cursor = root;
        self.selected = root;
        self.clock_anchor = root;
        info!("Loaded mainline with {} turns", records.len());
        Ok(())
    }

    // Makes a turn from the given node. If the same turn has already been explored, reuses the
    // existing node. Moves the cursor to the resulting node.
    pub fn try_apply_turn(
        &mut self, from: NodeId, turn: BughouseTurn,
    ) -> Result<NodeId, ApplyTurnError> {
        let node = self.get(from)?;
        let existing = node.children.iter().copied().find(|child| {
            self.existing(*child).incoming_turn.as_ref().is_some_and(|t| t.turn == turn)
        });
        let id = match existing {
            Some(child) => child,
            None => {
                let applied = node.position.try_turn(turn.board_idx, turn.turn, &self.rules)?;
                self.add_child(from, applied, None)
            }
        };
        self.move_cursor(id);
        Ok(id)
    }

    pub fn try_apply_algebraic(
        &mut self, from: NodeId, board_idx: BughouseBoard, notation: &str,
    ) -> Result<NodeId, ApplyTurnError> {
        let position = &self.get(from)?.position;
        if position.status() != BughouseGameStatus::Active {
            return Err(TurnError::GameOver.into());
        }
        let turn = position.parse_turn(board_idx, notation)?;
        self.try_apply_turn(from, BughouseTurn { board_idx, turn })
    }

    fn add_child(
        &mut self, parent: NodeId, applied: TurnApplied, timestamp_millis: Option<u64>,
    ) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let player = self.existing(parent).position.active_player(applied.turn.board_idx);
        let node = AnalysisNode {
            id,
            parent: Some(parent),
            incoming_turn: Some(NodeTurn {
                turn: applied.turn,
                player,
                notation: applied.notation,
                captured: applied.captured,
                timestamp_millis,
            }),
            main_child: None,
            children: Vec::new(),
            position: applied.position,
        };
        self.nodes.insert(id, node);
        let parent_node = self.existing_mut(parent);
        parent_node.children.push(id);
        if parent_node.main_child.is_none() {
            parent_node.main_child = Some(id);
        }
        id
    }

    // Makes the node the main continuation of its parent. The previous main continuation becomes
    // a variation.
    pub fn promote_variation_one_level(&mut self, id: NodeId) -> Result<(), TreeError> {
        let parent = self.get(id)?.parent.ok_or(TreeError::RootNode)?;
        let parent_node = self.existing_mut(parent);
        if parent_node.main_child == Some(id) {
            return Err(TreeError::AlreadyMain(id));
        }
        trace!("Promoting node {id}");
        parent_node.main_child = Some(id);
        self.refresh_clock_anchor();
        Ok(())
    }

    // Removes all descendants of the node. The node itself stays.
    pub fn truncate_after_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.get(id)?;
        let removed_cursor = self.is_descendant(self.cursor, id);
        let removed_selected = self.is_descendant(self.selected, id);
        trace!("Removing descendants of node {id}");
        let node = self.existing_mut(id);
        node.main_child = None;
        for child in std::mem::take(&mut node.children) {
            self.remove_subtree(child);
        }
        if removed_cursor {
            self.cursor = id;
        }
        if removed_selected {
            self.selected = id;
        }
        self.refresh_clock_anchor();
        Ok(())
    }

    // Removes the node with all its descendants. Cursor and selection in the removed part are
    // moved to the parent.
    pub fn truncate_from_node_inclusive(&mut self, id: NodeId) -> Result<(), TreeError> {
        let parent = self.get(id)?.parent.ok_or(TreeError::RootNode)?;
        let removed_cursor = self.cursor == id || self.is_descendant(self.cursor, id);
        let removed_selected = self.selected == id || self.is_descendant(self.selected, id);
        trace!("Removing node {id} with descendants");
        let parent_node = self.existing_mut(parent);
        parent_node.children.retain(|child| *child != id);
        if parent_node.main_child == Some(id) {
            // The oldest remaining variation takes over.
            parent_node.main_child = parent_node.children.first().copied();
        }
        self.remove_subtree(id);
        if removed_cursor {
            self.cursor = parent;
        }
        if removed_selected {
            self.selected = parent;
        }
        self.refresh_clock_anchor();
        Ok(())
    }

    // Moves the cursor to the parent. Returns `None` at the root.
    pub fn nav_back(&mut self) -> Option<NodeId> {
        let parent = self.existing(self.cursor).parent?;
        self.move_cursor(parent);
        Some(parent)
    }

    pub fn nav_forward_or_open_selector(&mut self) -> NavForward {
        let children = self.existing(self.cursor).children.clone();
        match children.len() {
            0 => NavForward::NoContinuation,
            1 => {
                let child = children[0];
                self.move_cursor(child);
                NavForward::Advanced(child)
            }
            _ => NavForward::AmbiguousChildren(children),
        }
    }

    pub fn set_cursor(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.get(id)?;
        self.move_cursor(id);
        Ok(())
    }

    pub fn select_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.get(id)?;
        self.selected = id;
        Ok(())
    }

    fn move_cursor(&mut self, id: NodeId) {
        self.cursor = id;
        if self.is_on_mainline(id) {
            self.clock_anchor = id;
        }
    }

    // Called after the tree structure changes.
    fn refresh_clock_anchor(&mut self) {
        if self.is_on_mainline(self.cursor) {
            self.clock_anchor = self.cursor;
        } else if !self.is_on_mainline(self.clock_anchor) {
            self.clock_anchor = self.deepest_mainline_ancestor(self.cursor);
        }
    }

    fn deepest_mainline_ancestor(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while !self.is_on_mainline(current) {
            match self.existing(current).parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }

    // Whether `id` is a strict descendant of `ancestor`.
    fn is_descendant(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.nodes.get(&id).and_then(|node| node.parent);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.existing(node_id).parent;
        }
        false
    }

    // Removes the node and its descendants from the arena. Does not touch the parent.
    fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
            }
        }
    }

    // Verifies structural invariants. Returns a description of the first violation.
    pub fn check_invariants(&self) -> Result<(), String> {
        let root = self.get(self.root).map_err(|err| err.to_string())?;
        if root.parent.is_some() || root.incoming_turn.is_some() {
            return Err(internal_error_message!("root {} has a parent", self.root));
        }
        for (id, node) in &self.nodes {
            if node.id != *id {
                return Err(internal_error_message!("node {id} is stored as {}", node.id));
            }
            if let Some(main_child) = node.main_child {
                if !node.children.contains(&main_child) {
                    return Err(internal_error_message!("main child of {id} is not a child"));
                }
            }
            if *id != self.root {
                let Some(parent) = node.parent.and_then(|p| self.nodes.get(&p)) else {
                    return Err(internal_error_message!("node {id} has no parent"));
                };
                if !parent.children.contains(id) {
                    return Err(internal_error_message!("node {id} is not a child of its parent"));
                }
                if node.incoming_turn.is_none() {
                    return Err(internal_error_message!("node {id} has no incoming turn"));
                }
            }
            for child in &node.children {
                if self.nodes.get(child).and_then(|c| c.parent) != Some(*id) {
                    return Err(internal_error_message!("child {child} of {id} is broken"));
                }
            }
        }
        // Every node is reachable from the root exactly once.
        let mut reachable = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            reachable += 1;
            if reachable > self.nodes.len() {
                return Err(internal_error_message!("cycle through node {id}"));
            }
            stack.extend(self.existing(id).children.iter().copied());
        }
        if reachable != self.nodes.len() {
            return Err(internal_error_message!(
                "{} nodes are not reachable",
                self.nodes.len() - reachable
            ));
        }
        for (name, id) in [
            ("cursor", self.cursor),
            ("selection", self.selected),
            ("clock anchor", self.clock_anchor),
        ] {
            if !self.nodes.contains_key(&id) {
                return Err(internal_error_message!("{name} points to missing node {id}"));
            }
        }
        if !self.is_on_mainline(self.clock_anchor) {
            return Err(internal_error_message!("clock anchor is not on the mainline"));
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Turn, TurnMove};
    use crate::coord::Coord;

    fn mv(board_idx: BughouseBoard, from: Coord, to: Coord) -> BughouseTurn {
        BughouseTurn {
            board_idx,
            turn: Turn::Move(TurnMove { from, to, promote_to: None }),
        }
    }

    #[test]
    fn apply_from_root() {
        use BughouseBoard::A;
        let mut tree = AnalysisTree::new(Rules::chess_com());
        let root = tree.root();
        let first = tree.try_apply_turn(root, mv(A, Coord::E2, Coord::E4)).unwrap();
        let second = tree.try_apply_turn(tree.cursor(), mv(A, Coord::E7, Coord::E5)).unwrap();
        assert_eq!(tree.num_nodes(), 3);
        assert_eq!(tree.node(root).unwrap().main_child(), Some(first));
        assert_eq!(tree.cursor(), second);
        assert_eq!(tree.node(second).unwrap().incoming_turn().unwrap().notation, "e5");
        tree.check_invariants().unwrap();
    }

    #[test]
    fn reuse_existing_child() {
        use BughouseBoard::A;
        let mut tree = AnalysisTree::new(Rules::chess_com());
        let root = tree.root();
        let first = tree.try_apply_turn(root, mv(A, Coord::E2, Coord::E4)).unwrap();
        let again = tree.try_apply_algebraic(root, A, "e4").unwrap();
        assert_eq!(first, again);
        assert_eq!(tree.num_nodes(), 2);
    }

    #[test]
    fn illegal_turn_leaves_tree_intact() {
        let mut tree = AnalysisTree::new(Rules::chess_com());
        let before = tree.clone();
        assert_eq!(
            tree.try_apply_turn(tree.root(), mv(BughouseBoard::B, Coord::E2, Coord::E5)),
            Err(ApplyTurnError::Turn(TurnError::ImpossibleTrajectory))
        );
        assert_eq!(
            tree.try_apply_algebraic(NodeId(42), BughouseBoard::A, "e4"),
            Err(ApplyTurnError::Tree(TreeError::UnknownNode(NodeId(42))))
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn root_operations_are_rejected() {
        let mut tree = AnalysisTree::new(Rules::chess_com());
        let root = tree.root();
        assert_eq!(tree.promote_variation_one_level(root), Err(TreeError::RootNode));
        assert_eq!(tree.truncate_from_node_inclusive(root), Err(TreeError::RootNode));
        assert_eq!(tree.nav_back(), None);
        assert_eq!(tree.nav_forward_or_open_selector(), NavForward::NoContinuation);
    }
}

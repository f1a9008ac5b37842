//! Demo data for `papergen init` and tests.
//!
//! The bank is sized so the default blueprint yields exactly three papers:
//! Part A has four questions per outcome, Part B six per group.

use papergen_core::blueprint::Structure;
use papergen_core::model::{Blueprint, Course, Difficulty, QuestionKind};

use crate::error::StoreError;
use crate::memory::{InMemoryStore, NewQuestion};

/// Name of the blueprint [`seed_demo`] installs as the default.
pub const DEMO_BLUEPRINT: &str = "Standard Semester Exam";

const UNITS: [&str; 4] = [
    "Introduction to Data Structures, Arrays, Linked Lists",
    "Stacks, Queues, and their applications",
    "Trees, Binary Trees, BST, AVL Trees",
    "Graphs, Graph Traversal, Shortest Path Algorithms",
];

const OUTCOMES: [&str; 6] = [
    "Understand basic data structures and their operations",
    "Apply appropriate data structures for problem solving",
    "Analyze time and space complexity of algorithms",
    "Implement common algorithms using various data structures",
    "Design efficient solutions for complex problems",
    "Evaluate and compare different algorithmic approaches",
];

/// Two-mark questions by outcome, with the unit (0-based) each belongs to.
const SHORT: [(u8, usize, &str); 20] = [
    (1, 0, "Define a linked list and state one advantage over arrays."),
    (1, 1, "Explain the LIFO property of a stack."),
    (1, 2, "What is the height of a binary tree?"),
    (1, 3, "Define an adjacency matrix."),
    (2, 1, "Which data structure suits undo operations in an editor, and why?"),
    (2, 1, "Name a data structure for breadth-first traversal and justify it."),
    (2, 0, "When is a doubly linked list preferable to a singly linked one?"),
    (2, 2, "Which structure gives ordered iteration over keys?"),
    (3, 0, "State the worst-case cost of inserting at the head of an array."),
    (3, 2, "Give the time complexity of searching a balanced BST."),
    (3, 3, "What is the space complexity of an adjacency list?"),
    (3, 1, "State the amortised cost of push on a dynamic-array stack."),
    (4, 1, "Write the push operation for an array-based stack."),
    (4, 0, "Write a function that reverses a singly linked list."),
    (4, 2, "Write the inorder traversal of a binary tree."),
    (4, 3, "Write the relaxation step of Dijkstra's algorithm."),
    (5, 1, "Sketch a queue that supports O(1) enqueue and dequeue."),
    (5, 2, "Propose a structure for fast prefix lookups of words."),
    (5, 3, "Outline a way to detect a cycle in a directed graph."),
    (5, 0, "Sketch a circular buffer for a fixed-size log."),
];

/// Part B questions by mark value and outcome.
const LONG: [(u32, u8, usize, &str); 24] = [
    (8, 1, 0, "Explain insertion and deletion in a singly linked list with diagrams."),
    (8, 1, 1, "Describe stack and queue operations and trace them on an example."),
    (8, 1, 2, "Explain binary search tree insertion, deletion and search."),
    (8, 1, 3, "Describe graph representations and compare their operations."),
    (8, 1, 2, "Explain AVL rotations with an example for each case."),
    (8, 1, 0, "Describe array and linked list operations and their costs."),
    (8, 2, 1, "Write an algorithm to implement a queue using two stacks."),
    (8, 2, 1, "Use a stack to evaluate a postfix expression; trace an example."),
    (8, 2, 3, "Apply BFS to find the shortest path in an unweighted graph."),
    (8, 2, 2, "Use a BST to maintain a sorted symbol table; show each operation."),
    (8, 2, 0, "Apply linked lists to represent and add two polynomials."),
    (8, 2, 3, "Apply topological sorting to schedule dependent tasks."),
    (6, 5, 3, "Design an algorithm to detect whether a graph is bipartite."),
    (6, 5, 2, "Design a structure supporting insert, delete and find-min in O(log n)."),
    (6, 5, 1, "Design a stack that returns its minimum element in O(1)."),
    (6, 5, 0, "Design an LRU cache using a hash map and a linked list."),
    (6, 5, 3, "Design a route planner on top of Dijkstra's algorithm."),
    (6, 5, 2, "Design a scheme to serialise and rebuild a binary tree."),
    (5, 6, 3, "Compare BFS and DFS for graph traversal."),
    (5, 6, 3, "Compare Dijkstra's and Bellman-Ford algorithms."),
    (5, 6, 2, "Compare AVL trees and plain binary search trees."),
    (5, 6, 0, "Compare arrays and linked lists for random access."),
    (5, 6, 1, "Evaluate array-based and linked queues."),
    (5, 6, 2, "Evaluate recursive and iterative tree traversal."),
];

/// Populate `store` with the CS101 demo course and a default blueprint.
pub fn seed_demo(store: &InMemoryStore) -> Result<(Course, Blueprint), StoreError> {
    let course = store.add_course("CS101", "Data Structures and Algorithms");

    let mut units = Vec::with_capacity(UNITS.len());
    for (i, content) in UNITS.iter().enumerate() {
        units.push(store.add_unit(course.id, i as u32 + 1, content)?);
    }
    for (i, description) in OUTCOMES.iter().enumerate() {
        store.add_outcome(course.id, i as u8 + 1, description)?;
    }

    for &(co, unit, text) in &SHORT {
        store.add_question(NewQuestion {
            course_id: course.id,
            text: text.to_string(),
            kind: QuestionKind::ShortAnswer,
            marks: 2,
            difficulty: Difficulty::Easy,
            unit_id: units[unit].id,
            outcomes: vec![co],
        })?;
    }
    for &(marks, co, unit, text) in &LONG {
        store.add_question(NewQuestion {
            course_id: course.id,
            text: text.to_string(),
            kind: QuestionKind::LongAnswer,
            marks,
            difficulty: if marks == 8 { Difficulty::Hard } else { Difficulty::Medium },
            unit_id: units[unit].id,
            outcomes: vec![co],
        })?;
    }

    let doc = serde_json::to_value(Structure::default_layout())?;
    let blueprint = store.create_blueprint(DEMO_BLUEPRINT, &doc)?;
    let blueprint = store.set_default_blueprint(blueprint.id)?;

    Ok((course, blueprint))
}

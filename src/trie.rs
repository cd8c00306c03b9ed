//! Byte-indexed trie used for the reserved-word table.
//!
//! Each node has exactly 256 children, one per possible byte value, plus a
//! 16-bit value slot. `0` is reserved to mean "no value stored here", so
//! token kinds stored in the trie are represented as `NonZeroU16`-shaped
//! plain `u16`s starting at `1`. Nodes are allocated from an [`Arena`] and
//! never freed individually, matching the keyword table in the reference
//! lexer, which builds the trie once at startup and never mutates it again.

use crate::arena::Arena;

pub struct TrieNode<'a> {
    children: [Option<&'a TrieNode<'a>>; 256],
    value: u16,
}

impl<'a> TrieNode<'a> {
    fn empty() -> Self {
        Self {
            children: [None; 256],
            value: 0,
        }
    }
}

/// A byte-keyed trie allocated out of an [`Arena`].
pub struct Trie<'a> {
    arena: &'a Arena,
    root: &'a mut TrieNode<'a>,
}

impl<'a> Trie<'a> {
    pub fn new(arena: &'a Arena) -> Self {
        let root = arena.alloc(TrieNode::empty());
        Self { arena, root }
    }

    /// Inserts `key` mapped to `value`. `value` must be nonzero; `0` is the
    /// sentinel returned by [`get`](Self::get) for "not found".
    pub fn insert(&mut self, key: &[u8], value: u16) {
        debug_assert_ne!(value, 0, "0 is reserved as the not-found sentinel");
        let mut node: *mut TrieNode<'a> = self.root;
        for &byte in key {
            let existing = unsafe { (*node).children[byte as usize] };
            let next_ptr = match existing {
                Some(child) => child as *const TrieNode<'a> as *mut TrieNode<'a>,
                None => {
                    let fresh_ptr: *mut TrieNode<'a> = self.arena.alloc(TrieNode::empty());
                    unsafe {
                        (*node).children[byte as usize] = Some(&*fresh_ptr);
                    }
                    fresh_ptr
                }
            };
            node = next_ptr;
        }
        unsafe {
            (*node).value = value;
        }
    }

    /// Looks up `key`, returning `0` ("not found") if any byte along the
    /// path has no child or the terminal node has no stored value.
    pub fn get(&self, key: &[u8]) -> u16 {
        let mut node: &TrieNode<'a> = self.root;
        for &byte in key {
            match node.children[byte as usize] {
                Some(child) => node = child,
                None => return 0,
            }
        }
        node.value
    }
}

pub mod sa;
pub mod trie;

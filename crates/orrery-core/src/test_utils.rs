//! Test fixtures for Orrery

use crate::model::{FileEntry, RawEdge};

/// `src/a.ts` imports `src/b.ts` and `react`; `lib/c.ts` stands alone.
pub fn scenario_a() -> (Vec<FileEntry>, Vec<RawEdge>) {
    let files = vec![
        FileEntry::file("src/a.ts"),
        FileEntry::file("src/b.ts"),
        FileEntry::file("lib/c.ts"),
    ];
    let edges = vec![
        RawEdge::import("src/a.ts", "src/b.ts"),
        RawEdge::import("src/a.ts", "react"),
    ];
    (files, edges)
}

/// `count` files spread over eight top-level folders with two nesting levels.
pub fn wide_repo(count: usize) -> Vec<FileEntry> {
    (0..count)
        .map(|i| {
            let top = i % 8;
            let sub = (i / 8) % 5;
            FileEntry::file(format!("mod{top}/part{sub}/file{i:03}.ts"))
        })
        .collect()
}

/// A chain `n0 → n1 → … → n{len-1}` at the repository top level.
pub fn chain(len: usize) -> (Vec<FileEntry>, Vec<RawEdge>) {
    let files = (0..len).map(|i| FileEntry::file(format!("n{i}.ts"))).collect();
    let edges = (1..len)
        .map(|i| RawEdge::import(format!("n{}.ts", i - 1), format!("n{i}.ts")))
        .collect();
    (files, edges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_sizes() {
        assert_eq!(wide_repo(400).len(), 400);
        let (files, edges) = chain(4);
        assert_eq!(files.len(), 4);
        assert_eq!(edges.len(), 3);
    }
}

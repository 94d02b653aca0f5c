//! Directory pages: a doubly-linked list of fixed-capacity pages rooted at a
//! well-known key, used for owner directories and the per-token NFT buy/sell
//! directories.
//!
//! Grounded in spec §4.3; the teacher has no direct analog (its directories
//! are entirely host-FFI-maintained), so the paged-iteration shape here
//! instead borrows from the teacher's `core/ledger_objects/array_object.rs`
//! iteration style, adapted to a page that lives behind a `LedgerView`
//! instead of a locator into host memory.

use crate::error::{CoreError, CoreResult};
use crate::ledger::entries::{DIRECTORY_PAGE_CAPACITY, DirectoryNode, LedgerEntry};
use crate::ledger::LedgerView;
use crate::types::account_id::AccountID;
use crate::types::hash::Hash256;
use sha2::{Digest, Sha512};

/// Derives the key for the `page_number`'th continuation page of a
/// directory rooted at `root`. Page 0 is the root itself.
fn continuation_page_key(root: Hash256, page_number: u64) -> Hash256 {
    let mut hasher = Sha512::new();
    hasher.update(b"dir-page");
    hasher.update(root.as_bytes());
    hasher.update(page_number.to_be_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[0..32]);
    Hash256::from(out)
}

fn read_page(view: &dyn LedgerView, key: Hash256) -> Option<DirectoryNode> {
    view.read(key).ok().and_then(|e| e.as_directory_node().cloned())
}

/// Inserts `entry_key` into the directory rooted at `root`, creating the
/// root page if absent and a new continuation page if the tail page is full.
/// Returns the zero-based page index the entry landed on (the "hint" callers
/// store back onto the inserted entry for O(1) removal).
pub fn insert(
    view: &mut dyn LedgerView,
    root: Hash256,
    owner: AccountID,
    entry_key: Hash256,
) -> CoreResult<u64> {
    match read_page(view, root) {
        None => {
            let page = DirectoryNode {
                owner,
                indexes: vec![entry_key],
                index_previous: None,
                index_next: None,
            };
            view.insert(root, LedgerEntry::DirectoryNode(page))
                .map_err(|_| CoreError::EntryAlreadyExists)?;
            Ok(0)
        }
        Some(_) => {
            let mut page_key = root;
            let mut page_index = 0u64;
            let mut page = read_page(view, page_key).expect("root page exists");
            while let Some(next) = page.index_next {
                page_key = next;
                page_index += 1;
                page = read_page(view, page_key).expect("linked page must exist");
            }

            if page.indexes.len() < DIRECTORY_PAGE_CAPACITY {
                page.indexes.push(entry_key);
                view.update(page_key, LedgerEntry::DirectoryNode(page))
                    .map_err(|_| CoreError::EntryNotFound)?;
                Ok(page_index)
            } else {
                let new_index = page_index + 1;
                let new_key = continuation_page_key(root, new_index);
                let new_page = DirectoryNode {
                    owner,
                    indexes: vec![entry_key],
                    index_previous: Some(page_key),
                    index_next: None,
                };
                view.insert(new_key, LedgerEntry::DirectoryNode(new_page))
                    .map_err(|_| CoreError::EntryAlreadyExists)?;

                page.index_next = Some(new_key);
                view.update(page_key, LedgerEntry::DirectoryNode(page))
                    .map_err(|_| CoreError::EntryNotFound)?;
                Ok(new_index)
            }
        }
    }
}

/// Removes `entry_key` from the directory rooted at `root`. `hint` is the
/// page index returned by `insert`; if it no longer matches (the directory
/// has been compacted since), falls back to a linear scan from the root.
/// When `keep_root` is false and removal empties the root page with no
/// continuation pages, the root page itself is erased.
pub fn remove(
    view: &mut dyn LedgerView,
    root: Hash256,
    hint: u64,
    entry_key: Hash256,
    keep_root: bool,
) -> CoreResult<()> {
    let page_key = locate_page_with_entry(view, root, hint, entry_key)?;
    let mut page = read_page(view, page_key).ok_or(CoreError::EntryNotFound)?;
    let position = page
        .indexes
        .iter()
        .position(|k| *k == entry_key)
        .ok_or(CoreError::EntryNotFound)?;
    page.indexes.remove(position);

    if page.indexes.is_empty() && (page_key != root || !keep_root) {
        let prev = page.index_previous;
        let next = page.index_next;
        view.erase(page_key).map_err(|_| CoreError::EntryNotFound)?;
        if let Some(prev_key) = prev {
            let mut prev_page = read_page(view, prev_key).expect("previous page must exist");
            prev_page.index_next = next;
            view.update(prev_key, LedgerEntry::DirectoryNode(prev_page))
                .map_err(|_| CoreError::EntryNotFound)?;
        }
        if let Some(next_key) = next {
            let mut next_page = read_page(view, next_key).expect("next page must exist");
            next_page.index_previous = prev;
            view.update(next_key, LedgerEntry::DirectoryNode(next_page))
                .map_err(|_| CoreError::EntryNotFound)?;
        }
    } else {
        view.update(page_key, LedgerEntry::DirectoryNode(page))
            .map_err(|_| CoreError::EntryNotFound)?;
    }
    Ok(())
}

fn locate_page_with_entry(
    view: &dyn LedgerView,
    root: Hash256,
    hint: u64,
    entry_key: Hash256,
) -> CoreResult<Hash256> {
    let hinted_key = if hint == 0 {
        root
    } else {
        continuation_page_key(root, hint)
    };
    if let Some(page) = read_page(view, hinted_key) {
        if page.indexes.contains(&entry_key) {
            return Ok(hinted_key);
        }
    }

    let mut page_key = root;
    loop {
        let page = read_page(view, page_key).ok_or(CoreError::EntryNotFound)?;
        if page.indexes.contains(&entry_key) {
            return Ok(page_key);
        }
        match page.index_next {
            Some(next) => page_key = next,
            None => return Err(CoreError::EntryNotFound),
        }
    }
}

/// Visits every entry key in the directory rooted at `root`, in page order
/// then insertion order within a page.
pub fn for_each(view: &dyn LedgerView, root: Hash256, mut callback: impl FnMut(Hash256)) {
    let mut page_key = root;
    while let Some(page) = read_page(view, page_key) {
        for key in &page.indexes {
            callback(*key);
        }
        match page.index_next {
            Some(next) => page_key = next,
            None => break,
        }
    }
}

//! Tag interning and loading from several threads.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use yamlet_tree::{Loader, Tag, TagRegistry};

const THREADS: usize = 8;

#[test]
fn interning_agrees_across_threads() {
    let registry = Arc::new(TagRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|n| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                // Each thread walks the names in a different order.
                let mut tags = vec![Tag::UNRESOLVED; 200];
                for i in 0..200 {
                    let i = (i + n * 25) % 200;
                    tags[i] = registry.intern(&format!("!tag{i}"));
                }
                tags
            })
        })
        .collect();
    let results: Vec<Vec<Tag>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for tags in &results[1..] {
        assert_eq!(tags, &results[0]);
    }
    let unique: HashSet<_> = results[0].iter().collect();
    assert_eq!(unique.len(), 200);
    assert_eq!(registry.len(), 14 + 200);
    for (i, tag) in results[0].iter().enumerate() {
        assert_eq!(registry.name(*tag).as_deref(), Some(format!("!tag{i}").as_str()));
    }
}

#[test]
fn parallel_loads_share_a_registry() {
    let registry = Arc::new(TagRegistry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|n| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let source = format!("!shared {{id: {n}, at: !point [1, 2], own: !t{n} x}}");
                let loader = Loader::from_text(source).unwrap().with_registry(registry);
                barrier.wait();
                loader.load().unwrap()
            })
        })
        .collect();
    let roots: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let shared = registry.lookup("!shared").unwrap();
    let point = registry.lookup("!point").unwrap();
    for (n, root) in roots.iter().enumerate() {
        assert_eq!(root.tag(), shared);
        assert_eq!(root.get("at").unwrap().tag(), point);
        assert_eq!(root.get("id").unwrap().tag(), Tag::INT);
        let own = root.get("own").unwrap().tag();
        assert_eq!(registry.name(own).as_deref(), Some(format!("!t{n}").as_str()));
    }
    assert_eq!(registry.len(), 14 + 2 + THREADS);
}

#[test]
fn nodes_move_between_threads() {
    let root = yamlet_tree::load("a: &x [1, 2]\nb: *x\n").unwrap();
    let copy = root.clone();
    let same = thread::spawn(move || {
        yamlet_tree::Node::ptr_eq(copy.get("a").unwrap(), copy.get("b").unwrap())
    })
    .join()
    .unwrap();
    assert!(same);
}

//! Property tests for yamlet-tree.

use proptest::prelude::*;
use yamlet_tree::{ScalarStyle, load};

/// Text that YAML reads back as the same plain scalar.
const PLAIN_ASCII: &str = "[a-zA-Z0-9]([a-zA-Z0-9 ._/()=+-]{0,40}[a-zA-Z0-9])?";

proptest! {
    #[test]
    fn plain_scalar_round_trips(text in PLAIN_ASCII) {
        let root = load(&text).unwrap();
        prop_assert_eq!(root.as_str(), Some(text.as_str()));
        prop_assert_eq!(root.scalar_style(), Some(ScalarStyle::Plain));
    }

    #[test]
    fn plain_scalar_round_trips_as_value(text in PLAIN_ASCII) {
        let root = load(&format!("key: {text}\nlist:\n  - {text}\n")).unwrap();
        prop_assert_eq!(root.get("key").and_then(|n| n.as_str()), Some(text.as_str()));
        let item = root.get("list").and_then(|n| n.index(0));
        prop_assert_eq!(item.and_then(|n| n.as_str()), Some(text.as_str()));
    }

    #[test]
    fn loading_never_panics(text in "[-a-z:\\[\\]{}&*!|>'\"#,? \n]{0,64}") {
        let _ = yamlet_tree::load_all(&text);
    }
}

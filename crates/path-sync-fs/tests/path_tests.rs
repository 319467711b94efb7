use path_sync_fs::NormalizedPath;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::path::PathBuf;

#[rstest]
#[case("docs/guide.md", "docs/guide.md")]
#[case("./docs//guide.md", "docs/guide.md")]
#[case("docs\\guide.md", "docs/guide.md")]
#[case("docs/", "docs")]
#[case(".", "")]
#[case("", "")]
fn normalizes_keys(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).as_str(), expected);
}

#[rstest]
#[case("", "a.py", "a.py")]
#[case("src", "", "src")]
#[case("src", "pkg/a.py", "src/pkg/a.py")]
#[case("src/", "./pkg/a.py", "src/pkg/a.py")]
fn join_normalizes(#[case] base: &str, #[case] segment: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(base).join(segment).as_str(), expected);
}

#[rstest]
#[case("a/b/file.tar.gz", Some("gz"))]
#[case("justfile", None)]
#[case(".gitignore", None)]
#[case("dir/.env.local", Some("local"))]
fn extension(#[case] input: &str, #[case] expected: Option<&str>) {
    assert_eq!(NormalizedPath::new(input).extension(), expected);
}

#[test]
fn file_name_of_nested_key() {
    let path = NormalizedPath::new("a/b/c.txt");
    assert_eq!(path.file_name(), Some("c.txt"));
    assert_eq!(NormalizedPath::new("").file_name(), None);
}

#[test]
fn to_native_round_trips_components() {
    let path = NormalizedPath::new("a/b/c.txt");
    assert_eq!(path.to_native(), PathBuf::from("a").join("b").join("c.txt"));
}

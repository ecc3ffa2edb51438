//! Integration tests for re-parsing streamed generation output.

use vibe_core::{extract, ContentType, FileSet, ENTRY_POINT};

const SINGLE_FILE_REPLY: &str = r#"Adding that dark mode toggle now!

```html
<!DOCTYPE html>
<html lang="en">
<head>
  <title>Vibe App</title>
</head>
<body>
  <div id="root"></div>
  <script type="text/babel">
    const label = `mode: ${dark ? "dark" : "light"}`;
    function App() { return <p>{label}</p>; }
  </script>
</body>
</html>
```

Let me know what to tweak next."#;

const MULTI_FILE_REPLY: &str = r#"Here is the project.

FILE-BOUNDARY: public/index.html
```html
<!DOCTYPE html>
<div id="root"></div>
```

FILE-BOUNDARY: src/App.jsx
```jsx
export default function App() {
  return <h1>Hello</h1>;
}
```

FILE-BOUNDARY: src/index.css
body { margin: 0; }
"#;

/// Every prefix of `text` that ends on a char boundary.
fn prefixes(text: &str) -> impl Iterator<Item = &str> {
    (0..=text.len())
        .filter(move |idx| text.is_char_boundary(*idx))
        .map(move |idx| &text[..idx])
}

fn entry_content(files: &FileSet) -> &str {
    &files.get(ENTRY_POINT).unwrap().content
}

#[test]
fn test_single_fence_reparse_is_monotonic() {
    let mut previous: Option<String> = None;

    for prefix in prefixes(SINGLE_FILE_REPLY) {
        let Some(files) = extract(prefix) else {
            assert!(
                previous.is_none(),
                "extraction regressed to None at prefix {:?}",
                prefix
            );
            continue;
        };

        assert_eq!(files.len(), 1);
        let current = entry_content(&files).to_string();
        if let Some(prev) = &previous {
            assert!(
                current.starts_with(prev.as_str()),
                "content shrank or changed:\n  before: {:?}\n  after:  {:?}",
                prev,
                current
            );
        }
        previous = Some(current);
    }

    let final_files = extract(SINGLE_FILE_REPLY).unwrap();
    let content = entry_content(&final_files);
    assert!(content.starts_with("<!DOCTYPE html>"));
    assert!(content.ends_with("</html>"));
}

#[test]
fn test_multi_file_stream_converges() {
    let mut seen_paths = 0;
    for prefix in prefixes(MULTI_FILE_REPLY) {
        if let Some(files) = extract(prefix) {
            assert!(files.len() >= seen_paths, "files disappeared at {:?}", prefix);
            seen_paths = files.len();
        }
    }
    assert_eq!(seen_paths, 3);

    let files = extract(MULTI_FILE_REPLY).unwrap();
    assert_eq!(files.get("public/index.html").unwrap().content_type, ContentType::Markup);
    assert_eq!(
        files.get("src/App.jsx").unwrap().content,
        "export default function App() {\n  return <h1>Hello</h1>;\n}"
    );
    assert_eq!(files.get("src/index.css").unwrap().content, "body { margin: 0; }");
}

#[test]
fn test_repeated_extraction_is_stable() {
    for text in [SINGLE_FILE_REPLY, MULTI_FILE_REPLY] {
        let first = extract(text);
        let second = extract(text);
        assert_eq!(first, second);
    }
}

#[test]
fn test_partial_marker_lines_never_name_files() {
    for text in [MULTI_FILE_REPLY, "FILE-BOUNDARY: src/App.jsx\napp\n"] {
        let final_files = extract(text).unwrap();
        for prefix in prefixes(text) {
            let Some(files) = extract(prefix) else {
                continue;
            };
            for path in files.paths() {
                assert!(
                    final_files.contains(path),
                    "unexpected file {:?} at prefix {:?}",
                    path,
                    prefix
                );
            }
        }
    }
}

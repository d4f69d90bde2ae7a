//! Runs the whole build against a small site on disk.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tagsite::build::build_site;
use tagsite::config::Config;
use walkdir::WalkDir;

type TestResult = Result<(), Box<dyn Error>>;

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Lays out a project with two posts, a nav page, tag metadata, templates,
/// and static files, and returns its config.
fn project(root: &Path) -> Config {
    write(
        root,
        "content/posts/a.md",
        "---\ntitle: A\ndate: 2024-03-01\ntags: x, y\n---\nFirst post.\n",
    );
    write(root, "content/posts/b.md", "---\ntags: x\n---\nSecond post.\n");
    write(
        root,
        "content/posts/c.md",
        "---\ntitle: C\ndate: 2024-06-01\n---\n```\nlet x = 1;\n```\n",
    );
    write(root, "content/nav/about.md", "---\ntitle: About\n---\nAbout me.\n");
    write(
        root,
        "tags.yaml",
        "x:\n  display_name: Ex\n  order: 1\nunused:\n  description: never referenced\n",
    );
    write(
        root,
        "templates/post.html",
        concat!(
            "<h1>{{ .post.title }}</h1>",
            "{{ range .post.processed_tags }}",
            "<a href=\"{{ .url }}\">{{ .display_name }}</a>",
            "{{ end }}",
            "{{ .post.content }}",
        ),
    );
    write(
        root,
        "templates/tag.html",
        concat!(
            "<h1>{{ .tag.display_name }} ({{ .tag.count }})</h1>",
            "<ul>{{ range .posts }}<li>{{ .slug }}</li>{{ end }}</ul>",
        ),
    );
    write(
        root,
        "templates/index.html",
        concat!(
            "<title>{{ .site.title }}</title>",
            "{{ range .posts }}",
            "<li>{{ .slug }} {{ date .date \"%b %Y\" }} {{ excerpt .content 60 }}</li>",
            "{{ end }}",
            "{{ range .nav }}<a href=\"{{ .url }}\">{{ .title }}</a>{{ end }}",
        ),
    );
    write(
        root,
        "templates/tags.html",
        "{{ range .tags }}{{ .name }}={{ .count }};{{ end }}",
    );
    write(root, "static/css/site.css", "body { margin: 0; }\n");

    Config::from_yaml("site_title: Test Site\n")
        .unwrap()
        .rooted_at(root)
}

/// Reads every file beneath `root` keyed by its relative path.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            (
                entry.path().strip_prefix(root).unwrap().to_owned(),
                fs::read(entry.path()).unwrap(),
            )
        })
        .collect()
}

#[test]
fn test_build_site() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = project(dir.path());

    let summary = build_site(&config)?;
    assert_eq!(3, summary.posts);
    assert_eq!(1, summary.nav);
    assert_eq!(2, summary.tags);

    let site = &config.output_dir;
    let read = |p: &str| fs::read_to_string(site.join(p));

    assert_eq!("<h1>Ex (2)</h1><ul><li>a</li><li>b</li></ul>", read("tags/x.html")?);
    assert_eq!("<h1>y (1)</h1><ul><li>a</li></ul>", read("tags/y.html")?);
    assert!(!site.join("tags/unused.html").exists());

    assert_eq!(
        concat!(
            "<h1>A</h1>",
            "<a href=\"/tags/x.html\">Ex</a>",
            "<a href=\"/tags/y.html\">y</a>",
            "<p>First post.</p>\n",
        ),
        read("posts/a.html")?
    );
    assert_eq!("<h1>About</h1><p>About me.</p>\n", read("about.html")?);
    assert_eq!("x=2;y=1;", read("tags.html")?);
    assert_eq!("body { margin: 0; }\n", read("static/css/site.css")?);

    let index = read("index.html")?;
    assert!(index.starts_with("<title>Test Site</title>"));
    let c = index
        .find("<li>c Jun 2024 <pre><code>let x = 1;\n</code></pre>\n</li>")
        .unwrap();
    let a = index.find("<li>a Mar 2024 <p>First post.</p>\n</li>").unwrap();
    let b = index.find("<li>b  <p>Second post.</p>\n</li>").unwrap();
    assert!(c < a && a < b);
    assert!(index.ends_with("<a href=\"/about.html\">About</a>"));
    Ok(())
}

#[test]
fn test_build_is_deterministic() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = project(dir.path());

    build_site(&config)?;
    let first = snapshot(&config.output_dir);
    build_site(&config)?;
    let second = snapshot(&config.output_dir);

    assert!(!first.is_empty());
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_build_clears_stale_output() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = project(dir.path());
    write(&config.output_dir, "posts/stale.html", "old");

    build_site(&config)?;
    assert!(!config.output_dir.join("posts/stale.html").exists());
    Ok(())
}

#[test]
fn test_optional_inputs_missing() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = project(dir.path());
    fs::remove_file(dir.path().join("tags.yaml"))?;
    fs::remove_file(dir.path().join("templates/tags.html"))?;
    fs::remove_dir_all(dir.path().join("static"))?;
    fs::remove_dir_all(dir.path().join("content/nav"))?;

    let summary = build_site(&config)?;
    assert_eq!(0, summary.nav);
    assert_eq!(
        "<h1>x (2)</h1><ul><li>a</li><li>b</li></ul>",
        fs::read_to_string(config.output_dir.join("tags/x.html"))?
    );
    assert!(!config.output_dir.join("tags.html").exists());
    assert!(!config.output_dir.join("static").exists());
    Ok(())
}

#[test]
fn test_missing_required_template_is_fatal() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = project(dir.path());
    fs::remove_file(dir.path().join("templates/tag.html"))?;

    let err = build_site(&config).unwrap_err();
    assert!(err.to_string().contains("tag.html"));
    Ok(())
}

//! End-to-end tests for the staged content pipeline.
//!
//! Each test builds a small site inside a scratch root directory, walks it
//! through every stage and inspects what `describe` answers and what ends up
//! on disk.

use std::{
    fs,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use lithograph_core::SiteOptions;
use lithograph_generator::{
    AuxiliaryPage, ContentSet, DynamicPage, GeneratorError, PageDefinition, PatternDefinition,
    ResponseKind, RouterResponse, StaticPage,
};

fn site_options(root: &Path) -> SiteOptions {
    SiteOptions::new(root, "example.com").with_port(8085)
}

async fn load_string(site: &ContentSet, url_path: &str) -> String {
    let item = site.describe(url_path).unwrap();
    String::from_utf8(site.load_content(&item).await.unwrap()).unwrap()
}

/// A static index page plus `/animal/{cat,dog}` written to files.
async fn animal_site(options: SiteOptions) -> ContentSet {
    let site = ContentSet::new(options).unwrap();
    site.done_with_widgets().await.unwrap();
    site.done_with_resources().await.unwrap();

    site.add_static_page(StaticPage::new("/", |_| Ok("<h1>Index</h1>".to_string())))
        .unwrap();

    let matcher = site
        .create_pattern_matcher(
            PatternDefinition::new()
                .literal("/animal/")
                .variable("animal")
                .values("animal", ["cat", "dog"]),
        )
        .unwrap();
    let matcher = Arc::new(matcher);
    let captures = Arc::clone(&matcher);
    site.add_dynamic_page(
        DynamicPage::new(matcher, move |ctx| {
            let captured = captures.match_path_or_err(ctx.url_path())?;
            Ok(format!("<h1>{}</h1>", captured["animal"]))
        })
        .render_to_files(),
    )
    .unwrap();

    site.done_with_pages().await.unwrap();
    site
}

#[tokio::test]
async fn test_static_and_pattern_pages() {
    let dir = tempfile::tempdir().unwrap();
    let site = animal_site(site_options(dir.path())).await;

    let item = site.describe("/animal/cat").unwrap();
    assert_eq!(item.response, ResponseKind::Ok);
    assert_eq!(item.mime, "text/html;charset=utf-8");
    assert_eq!(load_string(&site, "/animal/cat").await, "<h1>cat</h1>");

    let item = site.describe("/animal/fox").unwrap();
    assert_eq!(item.response, ResponseKind::NotFound);
    assert_eq!(item.response.status_code(), 404);

    site.write_all_to_disk().await.unwrap();

    let root = dir.path();
    assert_eq!(fs::read_to_string(root.join("index.html")).unwrap(), "<h1>Index</h1>");
    assert_eq!(
        fs::read_to_string(root.join("animal/cat.html")).unwrap(),
        "<h1>cat</h1>"
    );
    assert_eq!(
        fs::read_to_string(root.join("animal/dog.html")).unwrap(),
        "<h1>dog</h1>"
    );
    assert!(!root.join("animal/fox.html").exists());

    let mut written: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .map(Result::unwrap)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    written.sort();
    assert_eq!(written, ["animal/cat.html", "animal/dog.html", "index.html"]);
}

#[tokio::test]
async fn test_sitemap_lists_pages() {
    let dir = tempfile::tempdir().unwrap();
    let options = site_options(dir.path()).with_sitemap();
    let site = animal_site(options).await;

    let item = site.describe("/sitemap.xml").unwrap();
    assert_eq!(item.mime, "application/xml");

    let xml = load_string(&site, "/sitemap.xml").await;
    assert!(xml.contains("<loc>http://example.com:8085/</loc>"));
    assert!(xml.contains("<loc>http://example.com:8085/animal/cat</loc>"));
    assert!(xml.contains("<loc>http://example.com:8085/animal/dog</loc>"));

    site.write_all_to_disk().await.unwrap();
    assert!(dir.path().join("sitemap.xml").exists());
}

#[tokio::test]
async fn test_sitemap_disabled_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let site = animal_site(site_options(dir.path())).await;

    let item = site.describe("/sitemap.xml").unwrap();
    assert_eq!(item.response, ResponseKind::NotFound);
    site.write_all_to_disk().await.unwrap();
    assert!(!dir.path().join("sitemap.xml").exists());
}

#[tokio::test]
async fn test_router_redirects_and_pages() {
    let dir = tempfile::tempdir().unwrap();
    let site = ContentSet::new(site_options(dir.path())).unwrap();
    site.done_with_widgets().await.unwrap();
    site.done_with_resources().await.unwrap();

    let archive = site
        .add_page(PageDefinition::new(|ctx| {
            Ok(format!("archive for {}", ctx.url_path()))
        }))
        .unwrap();

    site.set_page_router(move |url_path| match url_path {
        "/old" => RouterResponse::PermanentRedirect("/new".to_string()),
        "/moved" => RouterResponse::TemporaryRedirect("/elsewhere".to_string()),
        path if path.starts_with("/archive/") => RouterResponse::Page(Arc::clone(&archive)),
        _ => RouterResponse::NotFound,
    })
    .unwrap();
    site.set_not_found_page(AuxiliaryPage::new(|ctx| {
        Ok(format!("nothing at {}", ctx.url_path()))
    }))
    .unwrap();
    site.done_with_pages().await.unwrap();

    let item = site.describe("/old").unwrap();
    assert_eq!(item.response.status_code(), 301);
    assert_eq!(item.response.redirect_to(), Some("/new"));

    let item = site.describe("/moved").unwrap();
    assert_eq!(item.response.status_code(), 302);
    assert_eq!(item.response.redirect_to(), Some("/elsewhere"));

    assert_eq!(
        load_string(&site, "/archive/2024").await,
        "archive for /archive/2024"
    );
    assert_eq!(load_string(&site, "/missing").await, "nothing at /missing");
}

#[tokio::test]
async fn test_assets_hashes_and_priority() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("js")).unwrap();
    fs::create_dir_all(root.join("img")).unwrap();
    fs::write(root.join("js/app.js"), "console.log('hi');").unwrap();
    fs::write(root.join("js/notes.txt"), "not a script").unwrap();
    fs::write(root.join("img/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    fs::write(root.join("robots.txt"), "User-agent: *").unwrap();

    let site = ContentSet::new(site_options(root)).unwrap();
    let link = site
        .add_widget::<str, _>(|ctx, href| {
            Ok(format!(
                r#"<link rel="stylesheet" href="{href}?{}">"#,
                ctx.hash_or_err(href)?
            ))
        })
        .unwrap();
    site.done_with_widgets().await.unwrap();

    site.add_script_directory("js").unwrap();
    site.set_image_directory("img").unwrap();
    site.add_resource("robots.txt").unwrap();
    // the same url path as the script; scripts are probed first
    site.add_resource("js/app.js").unwrap();
    site.add_stylesheet("/main.css", |ctx| {
        Ok(format!(
            "body {{ background: url(/img/logo.png?{}); }}",
            ctx.hash_or_err("/img/logo.png")?
        ))
    })
    .unwrap();
    site.done_with_resources().await.unwrap();

    site.add_static_page(StaticPage::new("/", move |ctx| {
        Ok(format!("<head>{}</head>", link.render(ctx, "/main.css")?))
    }))
    .unwrap();
    site.done_with_pages().await.unwrap();

    let script = site.describe("/js/app.js").unwrap();
    assert_eq!(script.mime, "application/javascript");
    assert_eq!(script.hash.as_deref().map(str::len), Some(64));
    assert_eq!(site.describe("/js/notes.txt").unwrap().response, ResponseKind::NotFound);

    let image = site.describe("/img/logo.png").unwrap();
    assert_eq!(image.mime, "image/png");
    let image_hash = image.hash.unwrap();

    let css = load_string(&site, "/main.css").await;
    assert!(css.contains(&image_hash));
    let style = site.describe("/main.css").unwrap();
    assert!(style.hash.is_some());

    let robots = site.describe("/robots.txt").unwrap();
    assert_eq!(robots.mime, "text/plain");
    assert_eq!(load_string(&site, "/robots.txt").await, "User-agent: *");

    let index = load_string(&site, "/").await;
    assert!(index.contains(&format!("/main.css?{}", style.hash.unwrap())));

    site.write_all_to_disk().await.unwrap();
    assert_eq!(fs::read_to_string(root.join("main.css")).unwrap(), css);
}

#[tokio::test]
async fn test_without_hashes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("robots.txt"), "User-agent: *").unwrap();

    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);

    let site = ContentSet::new(site_options(dir.path()).without_hashes()).unwrap();
    site.done_with_widgets().await.unwrap();
    site.add_resource("robots.txt").unwrap();
    site.add_stylesheet("/main.css", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok("body {}".to_string())
    })
    .unwrap();
    site.done_with_resources().await.unwrap();
    site.done_with_pages().await.unwrap();

    assert_eq!(built.load(Ordering::SeqCst), 0);
    assert!(site.describe("/robots.txt").unwrap().hash.is_none());
    assert!(site.describe("/main.css").unwrap().hash.is_none());
}

#[tokio::test]
async fn test_generation_test_runs_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let site = ContentSet::new(site_options(dir.path())).unwrap();
    site.done_with_widgets().await.unwrap();
    site.done_with_resources().await.unwrap();

    let matcher = site
        .create_pattern_matcher(
            PatternDefinition::new()
                .literal("/broken/")
                .variable("id")
                .values("id", ["1", "2"]),
        )
        .unwrap();
    site.add_dynamic_page(DynamicPage::new(matcher, |ctx| {
        Err(GeneratorError::Template(format!("cannot render {}", ctx.url_path())))
    }))
    .unwrap();
    site.done_with_pages().await.unwrap();

    let err = site.write_all_to_disk().await.unwrap_err();
    assert!(err.to_string().contains("cannot render /broken/1"));
}

#[tokio::test]
async fn test_generation_test_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let options = site_options(dir.path()).without_generation_tests();
    let site = ContentSet::new(options).unwrap();
    site.done_with_widgets().await.unwrap();
    site.done_with_resources().await.unwrap();

    let matcher = site
        .create_pattern_matcher(
            PatternDefinition::new()
                .literal("/broken/")
                .variable("id")
                .values("id", ["1"]),
        )
        .unwrap();
    site.add_dynamic_page(DynamicPage::new(matcher, |_| {
        Err(GeneratorError::Template("never rendered".to_string()))
    }))
    .unwrap();
    site.done_with_pages().await.unwrap();

    site.write_all_to_disk().await.unwrap();
}

#[tokio::test]
async fn test_empty_pattern_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let site = ContentSet::new(site_options(dir.path())).unwrap();
    site.done_with_widgets().await.unwrap();
    site.done_with_resources().await.unwrap();

    let matcher = site
        .create_pattern_matcher(
            PatternDefinition::new()
                .literal("/tag/")
                .variable("tag")
                .values("tag", Vec::<String>::new()),
        )
        .unwrap();
    let err = site
        .add_dynamic_page(DynamicPage::new(matcher, |_| Ok(String::new())))
        .unwrap_err();
    assert!(matches!(err, GeneratorError::PatternViolation(_)));
}

#[tokio::test]
async fn test_render_helpers() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("js")).unwrap();
    fs::create_dir_all(root.join("img")).unwrap();
    fs::write(root.join("js/app.js"), "console.log('hi');").unwrap();
    fs::write(root.join("img/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();

    let site = ContentSet::new(site_options(root)).unwrap();
    site.done_with_widgets().await.unwrap();
    site.add_script_directory("js").unwrap();
    site.set_image_directory("img").unwrap();
    site.add_stylesheet("/main.css", |_| Ok("body {}".to_string()))
        .unwrap();
    site.done_with_resources().await.unwrap();

    site.add_static_page(StaticPage::new("/", |_| Ok(String::new())))
        .unwrap();
    let archive = site
        .add_page(PageDefinition::new(|_| Ok(String::new())))
        .unwrap();
    site.set_page_router(move |url_path| match url_path {
        "/old" => RouterResponse::PermanentRedirect("/".to_string()),
        path if path.starts_with("/archive/") => RouterResponse::Page(Arc::clone(&archive)),
        _ => RouterResponse::NotFound,
    })
    .unwrap();

    let matcher = site
        .create_pattern_matcher(
            PatternDefinition::new()
                .literal("/animal/")
                .variable("animal")
                .values("animal", ["cat", "dog"]),
        )
        .unwrap();
    site.add_dynamic_page(DynamicPage::new(matcher, |ctx| {
        assert_eq!(ctx.resolve_url_path("../img/logo.png")?, "/img/logo.png");
        assert_eq!(ctx.resolve_url_path("dog")?, "/animal/dog");
        assert_eq!(ctx.resolve_url_path("/js/app.js")?, "/js/app.js");
        let err = ctx.resolve_url_path("https://example.com/x").unwrap_err();
        assert!(err.to_string().contains("it's not relative url"));

        assert!(ctx.url_points_to_page("/")?);
        assert!(ctx.url_points_to_page("dog")?);
        assert!(ctx.url_points_to_page("/archive/2024")?);
        assert!(!ctx.url_points_to_page("/old")?);
        assert!(!ctx.url_points_to_page("/main.css")?);
        assert!(!ctx.url_points_to_page("/missing")?);

        assert!(ctx.url_points_to_image("../img/logo.png")?);
        assert!(!ctx.url_points_to_image("/main.css")?);
        assert!(ctx.url_points_to_css_file("/main.css")?);
        assert!(!ctx.url_points_to_css_file("/js/app.js")?);
        assert!(ctx.url_points_to_js_file("/js/app.js")?);
        assert!(!ctx.url_points_to_js_file("/img/logo.png")?);

        assert!(ctx.url_points_to_content_item("/js/app.js")?);
        assert!(ctx.url_points_to_content_item("cat")?);
        assert!(!ctx.url_points_to_content_item("/missing")?);
        assert!(!ctx.url_points_to_content_item("/old")?);

        let info = ctx.image_info("../img/logo.png")?;
        assert_eq!(info.url_path, "/img/logo.png");
        assert_eq!(info.format, "png");
        assert_eq!(info.hash.as_deref().map(str::len), Some(64));
        assert!(ctx.image_info("/img/missing.png").is_err());

        assert_eq!(ctx.hash("../img/logo.png")?, info.hash);
        let err = ctx.hash("/missing").unwrap_err();
        assert!(err.to_string().contains("its response type is not_found"));
        let err = ctx.hash("/old").unwrap_err();
        assert!(err.to_string().contains("its response type is perm_redirect"));

        Ok(format!("checked {}", ctx.url_path()))
    }))
    .unwrap();
    site.done_with_pages().await.unwrap();

    assert_eq!(load_string(&site, "/animal/cat").await, "checked /animal/cat");
}

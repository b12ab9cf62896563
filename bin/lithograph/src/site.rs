//! Content set assembly from a site manifest.
//!
//! Relative template and stylesheet source paths are resolved against the
//! manifest's directory. Resource paths are resolved against the site root
//! directory, which itself is relative to the manifest's directory.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use color_eyre::eyre::{Result, WrapErr};
use lithograph_core::{AuxiliaryPageConfig, Config};
use lithograph_generator::{
    AuxiliaryPage, Captures, ContentSet, DynamicPage, PatternDefinition, RenderContext,
    RouterResponse, StaticPage, Template, TemplateContext, TemplateRegistry, Widget,
};
use tracing::{debug, info};

/// A loaded manifest and the directory it lives in.
#[derive(Debug, Clone)]
pub struct SiteManifest {
    config: Config,
    base_dir: PathBuf,
}

impl SiteManifest {
    /// Load the manifest, letting `LITHOGRAPH__*` environment variables override it.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Config::load_with_env(path)
            .wrap_err_with(|| format!("Failed to load manifest {}", path.display()))?;
        let base_dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        debug!(?config, base_dir = %base_dir.display(), "manifest loaded");
        Ok(Self::new(config, base_dir))
    }

    /// Manifest from an already parsed config.
    #[must_use]
    pub fn new(mut config: Config, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        if config.site.root_directory.is_relative() {
            config.site.root_directory = base_dir.join(&config.site.root_directory);
        }
        Self { config, base_dir }
    }

    /// Replace the root directory; relative paths are taken as they are.
    #[must_use]
    pub fn with_root(mut self, root: &Path) -> Self {
        info!(root = %root.display(), "overriding site root");
        self.config.site.root_directory = root.to_path_buf();
        self
    }

    /// Replace the port used in full urls.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.config.site.port = Some(port);
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Define the whole site and leave the content set in the run stage.
    pub async fn assemble(&self) -> Result<ContentSet> {
        let config = &self.config;
        let site = ContentSet::new(config.site.clone()).wrap_err("Invalid site options")?;

        let widgets = define_widgets(&site)?;
        site.done_with_widgets().await?;

        self.define_resources(&site).await?;
        site.done_with_resources().await?;

        let layout = |template: Arc<Template>| PageLayout {
            template,
            widgets: widgets.clone(),
            stylesheets: site.styles().url_paths().into(),
            scripts: site.scripts().url_paths().into(),
        };
        let templates = TemplateRegistry::new(&self.base_dir);

        for page in &config.pages {
            let layout = layout(templates.load(&page.template).await?);
            let mut static_page =
                StaticPage::new(page.url_path.clone(), move |ctx| layout.render(ctx, None));
            if !page.include_in_sitemap {
                static_page = static_page.exclude_from_sitemap();
            }
            if !page.generate_file {
                static_page = static_page.without_file();
            }
            site.add_static_page(static_page)?;
        }

        for page in &config.dynamic_pages {
            let definition =
                PatternDefinition::from_segments(&page.pattern, page.values.clone());
            let matcher = Arc::new(site.create_pattern_matcher(definition)?);
            let captures = Arc::clone(&matcher);
            let layout = layout(templates.load(&page.template).await?);

            let mut dynamic_page = DynamicPage::new(matcher, move |ctx| {
                let captured = captures.match_path_or_err(ctx.url_path())?;
                layout.render(ctx, Some(&captured))
            });
            if page.render_to_files {
                dynamic_page = dynamic_page.render_to_files();
            }
            if page.exclude_from_sitemap {
                dynamic_page = dynamic_page.exclude_from_sitemap();
            }
            site.add_dynamic_page(dynamic_page)?;
        }

        if let Some(page) = &config.not_found_page {
            let layout = layout(templates.load(&page.template).await?);
            site.set_not_found_page(auxiliary_page(page, layout))?;
        }
        if let Some(page) = &config.server_error_page {
            let layout = layout(templates.load(&page.template).await?);
            site.set_server_error_page(auxiliary_page(page, layout))?;
        }

        if !config.redirects.is_empty() {
            let redirects: HashMap<String, (String, bool)> = config
                .redirects
                .iter()
                .map(|r| (r.from.clone(), (r.to.clone(), r.permanent)))
                .collect();
            site.set_page_router(move |url_path| match redirects.get(url_path) {
                Some((to, true)) => RouterResponse::PermanentRedirect(to.clone()),
                Some((to, false)) => RouterResponse::TemporaryRedirect(to.clone()),
                None => RouterResponse::NotFound,
            })?;
        }

        site.done_with_pages().await?;

        info!(
            pages = site.pages().page_count(),
            templates = templates.len(),
            stylesheets = site.styles().url_paths().len(),
            scripts = site.scripts().url_paths().len(),
            "site assembled"
        );
        Ok(site)
    }

    async fn define_resources(&self, site: &ContentSet) -> Result<()> {
        let resources = &self.config.resources;

        for path in &resources.files {
            site.add_resource(path)?;
        }
        for path in &resources.directories {
            site.add_resource_directory(path)?;
        }
        if let Some(path) = &resources.image_directory {
            site.set_image_directory(path)?;
        }
        for path in &resources.script_files {
            site.add_script_file(path)?;
        }
        for path in &resources.script_directories {
            site.add_script_directory(path)?;
        }

        for sheet in &self.config.stylesheets {
            let mut css = String::new();
            for source in &sheet.sources {
                let path = self.base_dir.join(source);
                let content = tokio::fs::read_to_string(&path)
                    .await
                    .wrap_err_with(|| format!("Failed to read stylesheet source {}", path.display()))?;
                css.push_str(&content);
                if !css.ends_with('\n') {
                    css.push('\n');
                }
            }
            site.add_stylesheet(&sheet.url_path, move |_| Ok(css.clone()))?;
        }

        Ok(())
    }
}

fn auxiliary_page(config: &AuxiliaryPageConfig, layout: PageLayout) -> AuxiliaryPage {
    let mut page = AuxiliaryPage::new(move |ctx| layout.render(ctx, None));
    if let Some(url_path) = &config.url_path {
        page = page.at(url_path.clone());
    }
    if config.include_in_sitemap {
        page = page.include_in_sitemap();
    }
    if config.generate_file {
        page = page.generate_file();
    }
    page
}

/// Widgets shared by every page.
#[derive(Clone)]
struct Widgets {
    stylesheet_link: Widget<str>,
    script_tag: Widget<str>,
}

fn define_widgets(site: &ContentSet) -> Result<Widgets> {
    let stylesheet_link = site.add_widget::<str, _>(|ctx, href| {
        Ok(format!(
            r#"<link rel="stylesheet" href="{}">"#,
            ctx.escape_attribute(&versioned_url(ctx, href)?)
        ))
    })?;
    let script_tag = site.add_widget::<str, _>(|ctx, src| {
        Ok(format!(
            r#"<script src="{}" defer></script>"#,
            ctx.escape_attribute(&versioned_url(ctx, src)?)
        ))
    })?;

    Ok(Widgets {
        stylesheet_link,
        script_tag,
    })
}

/// `url` with its content hash as query string, when the item has one.
fn versioned_url(ctx: &RenderContext<'_>, url: &str) -> lithograph_generator::Result<String> {
    Ok(match ctx.hash(url)? {
        Some(hash) => format!("{url}?{hash}"),
        None => url.to_string(),
    })
}

/// A template plus the asset tags every page includes.
///
/// Templates see `url_path`, `url_root`, `domain`, `stylesheets`, `scripts`
/// and, for pattern pages, one variable per pattern capture.
#[derive(Clone)]
struct PageLayout {
    template: Arc<Template>,
    widgets: Widgets,
    stylesheets: Arc<[String]>,
    scripts: Arc<[String]>,
}

impl PageLayout {
    fn render(
        &self,
        ctx: &RenderContext<'_>,
        captures: Option<&Captures>,
    ) -> lithograph_generator::Result<String> {
        let render_all = |widget: &Widget<str>, urls: &[String]| {
            urls.iter()
                .map(|url| widget.render(ctx, url))
                .collect::<lithograph_generator::Result<Vec<_>>>()
                .map(|tags| tags.join("\n"))
        };

        let mut vars = TemplateContext::for_render(ctx);
        vars.insert(
            "stylesheets",
            render_all(&self.widgets.stylesheet_link, &self.stylesheets)?,
        );
        vars.insert("scripts", render_all(&self.widgets.script_tag, &self.scripts)?);
        if let Some(captures) = captures {
            vars.extend(captures.iter().map(|(name, value)| (name.clone(), value.clone())));
        }

        self.template.render(&vars)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use lithograph_generator::ResponseKind;

    use super::*;

    const MANIFEST: &str = r#"
[site]
root_directory = "public"
domain = "example.com"
use_sitemap = true

[resources]
files = ["robots.txt"]

[[stylesheets]]
url_path = "/main.css"
sources = ["css/base.css"]

[[pages]]
url_path = "/"
template = "templates/index.html"

[[dynamic_pages]]
pattern = ["/animal/", "{animal}"]
template = "templates/animal.html"
render_to_files = true

[dynamic_pages.values]
animal = ["cat", "dog"]

[not_found_page]
template = "templates/404.html"

[[redirects]]
from = "/about"
to = "/"
"#;

    fn write_site(dir: &Path) {
        fs::create_dir_all(dir.join("public")).unwrap();
        fs::create_dir_all(dir.join("css")).unwrap();
        fs::create_dir_all(dir.join("templates")).unwrap();
        fs::write(dir.join("lithograph.toml"), MANIFEST).unwrap();
        fs::write(dir.join("public/robots.txt"), "User-agent: *\n").unwrap();
        fs::write(dir.join("css/base.css"), "body { margin: 0; }").unwrap();
        fs::write(
            dir.join("templates/index.html"),
            "<head>{{ stylesheets }}</head><h1>{{ domain }}{{ url_path }}</h1>",
        )
        .unwrap();
        fs::write(dir.join("templates/animal.html"), "<h1>{{ animal }}</h1>").unwrap();
        fs::write(dir.join("templates/404.html"), "<h1>No {{ url_path }}</h1>").unwrap();
    }

    async fn body(site: &ContentSet, url_path: &str) -> String {
        let item = site.describe(url_path).unwrap();
        String::from_utf8(site.load_content(&item).await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_assemble_from_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path());

        let manifest = SiteManifest::load(&dir.path().join("lithograph.toml")).unwrap();
        assert_eq!(
            manifest.config().site.root_directory,
            dir.path().join("public")
        );
        let site = manifest.assemble().await.unwrap();

        let index = body(&site, "/").await;
        assert!(index.contains("<h1>example.com/</h1>"));
        let hash = site.describe("/main.css").unwrap().hash.unwrap();
        assert!(index.contains(&format!(r#"href="/main.css?{hash}""#)));

        assert_eq!(body(&site, "/animal/dog").await, "<h1>dog</h1>");
        assert_eq!(body(&site, "/nope").await, "<h1>No /nope</h1>");
        assert_eq!(body(&site, "/main.css").await, "body { margin: 0; }\n");

        let item = site.describe("/about").unwrap();
        assert_eq!(
            item.response,
            ResponseKind::PermanentRedirect { to: "/".to_string() }
        );
    }

    #[tokio::test]
    async fn test_missing_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        write_site(dir.path());
        fs::remove_file(dir.path().join("templates/animal.html")).unwrap();

        let manifest = SiteManifest::load(&dir.path().join("lithograph.toml")).unwrap();
        let err = manifest.assemble().await.unwrap_err();
        assert!(format!("{err:#}").contains("animal.html"));
    }
}

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tdoc::markdown;
use thiserror::Error;
use tracing::{debug, info};

use crate::navigator::ContentRoot;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("failed to parse page `{page}`: {message}")]
    Parse { page: String, message: String },
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("unknown page `{0}`")]
    UnknownPage(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageIcon {
    Folder,
    React,
    Ignore,
    Markdown,
}

impl PageIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            PageIcon::Folder => "▾",
            PageIcon::React => "⚛",
            PageIcon::Ignore => "⊘",
            PageIcon::Markdown => "M↓",
        }
    }
}

/// One entry of the file tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    /// Slug of the page the entry opens. Folders open nothing.
    pub page: Option<&'static str>,
    pub href: &'static str,
    pub title: &'static str,
    pub icon: PageIcon,
    pub level: usize,
}

impl Link {
    const fn folder(title: &'static str) -> Self {
        Self {
            page: None,
            href: "",
            title,
            icon: PageIcon::Folder,
            level: 0,
        }
    }

    const fn page(
        page: &'static str,
        href: &'static str,
        title: &'static str,
        icon: PageIcon,
        level: usize,
    ) -> Self {
        Self {
            page: Some(page),
            href,
            title,
            icon,
            level,
        }
    }
}

pub const LINK_LIST: [Link; 8] = [
    Link::folder("/me"),
    Link::page("about", "/about", "About.tsx", PageIcon::React, 1),
    Link::page("coding", "/coding", "Coding.tsx", PageIcon::React, 1),
    Link::page("nutrition", "/nutrition", "Nutrition.tsx", PageIcon::React, 1),
    Link::page("tech_stack", "/tech_stack", "TechStack.tsx", PageIcon::React, 1),
    Link::page("training", "/training", "Training.tsx", PageIcon::React, 1),
    Link::page("gitignore", "/gitignore", ".gitignore", PageIcon::Ignore, 0),
    Link::page("readme", "/", "Readme.md", PageIcon::Markdown, 0),
];

pub const DEFAULT_PAGE: &str = "readme";

const BUILTIN_PAGES: [(&str, &str); 7] = [
    ("readme", include_str!("../pages/readme.md")),
    ("about", include_str!("../pages/about.md")),
    ("coding", include_str!("../pages/coding.md")),
    ("nutrition", include_str!("../pages/nutrition.md")),
    ("tech_stack", include_str!("../pages/tech_stack.md")),
    ("training", include_str!("../pages/training.md")),
    ("gitignore", include_str!("../pages/gitignore.md")),
];

#[derive(Clone, Debug)]
pub struct Page {
    pub slug: &'static str,
    pub title: &'static str,
    pub root: ContentRoot,
}

/// Every page of the portfolio, parsed once at start-up.
#[derive(Clone, Debug)]
pub struct Site {
    pages: Vec<Page>,
}

impl Site {
    pub fn builtin() -> Result<Self, SiteError> {
        let pages = BUILTIN_PAGES
            .iter()
            .map(|&(slug, source)| build_page(slug, source))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { pages })
    }

    /// The bundled pages with `<slug>.md` files from `dir` taking precedence.
    pub fn from_dir(dir: &Path) -> Result<Self, SiteError> {
        let mut pages = Vec::with_capacity(BUILTIN_PAGES.len());
        for (slug, builtin) in BUILTIN_PAGES {
            let path = dir.join(format!("{slug}.md"));
            let page = if path.is_file() {
                let source = fs::read_to_string(&path).map_err(|source| SiteError::Io {
                    path: path.clone(),
                    source,
                })?;
                info!(page = slug, path = %path.display(), "loaded page override");
                build_page(slug, &source)?
            } else {
                build_page(slug, builtin)?
            };
            pages.push(page);
        }
        Ok(Self { pages })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, slug: &str) -> Result<&Page, SiteError> {
        self.pages
            .iter()
            .find(|page| page.slug == slug)
            .ok_or_else(|| SiteError::UnknownPage(slug.to_string()))
    }

    /// Position of the page's entry in [`LINK_LIST`].
    pub fn link_index(slug: &str) -> Option<usize> {
        LINK_LIST.iter().position(|link| link.page == Some(slug))
    }

    /// Route of the page, `/` for the readme.
    pub fn href(slug: &str) -> Option<&'static str> {
        LINK_LIST
            .iter()
            .find(|link| link.page == Some(slug))
            .map(|link| link.href)
    }
}

pub fn parse_page(slug: &str, source: &str) -> Result<ContentRoot, SiteError> {
    let document =
        markdown::parse(io::Cursor::new(source.to_owned())).map_err(|err| SiteError::Parse {
            page: slug.to_string(),
            message: err.to_string(),
        })?;
    let root = ContentRoot::from_document(&document);
    debug!(
        page = slug,
        containers = root.containers().len(),
        segments = root.segments().len(),
        "parsed page"
    );
    Ok(root)
}

fn build_page(slug: &'static str, source: &str) -> Result<Page, SiteError> {
    let title = LINK_LIST
        .iter()
        .find(|link| link.page == Some(slug))
        .map(|link| link.title)
        .unwrap_or(slug);
    Ok(Page {
        slug,
        title,
        root: parse_page(slug, source)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::{ContainerKind, Navigator};

    #[test]
    fn every_tree_page_is_bundled() {
        let site = Site::builtin().unwrap();
        for link in LINK_LIST.iter().filter_map(|link| link.page) {
            let page = site.page(link).unwrap();
            assert!(!page.root.is_empty(), "page {link} is empty");
        }
        assert_eq!(site.pages().len(), 7);
    }

    #[test]
    fn readme_starts_with_the_greeting() {
        let site = Site::builtin().unwrap();
        let navigator = Navigator::with_root(site.page(DEFAULT_PAGE).unwrap().root.clone());
        let context = navigator.local_context().unwrap();
        assert_eq!(context.marker, 'H');
        assert!(context.merged().starts_with("Hey"));
    }

    #[test]
    fn gitignore_is_a_code_block() {
        let site = Site::builtin().unwrap();
        let page = site.page("gitignore").unwrap();
        assert_eq!(page.title, ".gitignore");
        assert_eq!(page.root.containers()[0].kind(), ContainerKind::Code);
    }

    #[test]
    fn unknown_page_is_an_error() {
        let site = Site::builtin().unwrap();
        let err = site.page("blog").unwrap_err();
        assert!(matches!(err, SiteError::UnknownPage(ref slug) if slug == "blog"));
    }

    #[test]
    fn link_index_follows_the_tree_order() {
        assert_eq!(Site::link_index("about"), Some(1));
        assert_eq!(Site::link_index("readme"), Some(7));
        assert_eq!(Site::link_index("nope"), None);
        assert_eq!(Site::href("about"), Some("/about"));
        assert_eq!(Site::href("readme"), Some("/"));
        assert_eq!(Site::href("nope"), None);
        assert_eq!(LINK_LIST[0].page, None);
        assert_eq!(LINK_LIST[0].icon.glyph(), "▾");
    }

    #[test]
    fn parsed_markdown_keeps_headings_and_lists() {
        let root = parse_page("test", "# Title\n\nSome text.\n\n- one\n- two\n").unwrap();
        let kinds: Vec<_> = root.containers().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ContainerKind::Heading(1),
                ContainerKind::Text,
                ContainerKind::ListItem,
                ContainerKind::ListItem
            ]
        );
    }

    #[test]
    fn overrides_are_read_from_a_directory() {
        let dir = std::env::temp_dir().join(format!("termfolio-site-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("about.md"), "Overridden about page.\n").unwrap();

        let site = Site::from_dir(&dir).unwrap();
        let about = site.page("about").unwrap();
        assert!(about.root.segments()[0].text().starts_with("Overridden"));
        let readme = site.page("readme").unwrap();
        assert!(readme.root.segments()[0].text().starts_with("Hey"));

        fs::remove_dir_all(&dir).ok();
    }
}

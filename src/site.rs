//! Reference admissions page.
//!
//! Renders a complete page that honors the markup contract of the current
//! [`MarkupConfig`]: every id, class and pending-source attribute the
//! controller looks up comes from config, so a page rendered here always
//! wires up fully.
//!
//! ## Page Layout
//!
//! ```text
//! header      hamburger + nav list (top links, submenu groups)
//! #about      title, tagline, markdown intro
//! #gallery    grid of lazy images + lightbox overlay
//! #faq        accordion toggles, each followed by its markdown answer
//! #apply      admission form + status line
//! footer      copyright with the year element
//! ```
//!
//! ## Content File
//!
//! Text, links and images come from [`SiteContent`]. Without a content file
//! the built-in demo content is used; a TOML file replaces whole sections:
//!
//! ```toml
//! title = "Northfield Institute"
//! tagline = "Admissions open for the spring intake"
//!
//! [[nav]]
//! label = "Programs"
//! children = [
//!   { label = "Web Development", href = "#apply" },
//! ]
//!
//! [[gallery]]
//! src = "images/lab.jpg"
//! alt = "Computer lab"
//!
//! [[faqs]]
//! question = "Who can apply?"
//! answer = "Anyone with a **secondary school** certificate."
//! ```

use crate::config::{BehaviorConfig, MarkupConfig};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("content parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A nav entry. Entries with children render as a submenu group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavLink {
    pub label: String,
    #[serde(default)]
    pub href: Option<String>,
    #[serde(default)]
    pub children: Vec<NavLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryImage {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Faq {
    pub question: String,
    /// Markdown.
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Course {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteContent {
    pub title: String,
    pub tagline: String,
    /// Markdown shown in the about section.
    pub intro: String,
    /// `src` every gallery image starts with until it is promoted.
    pub placeholder: String,
    pub nav: Vec<NavLink>,
    pub gallery: Vec<GalleryImage>,
    pub faqs: Vec<Faq>,
    pub courses: Vec<Course>,
}

impl Default for SiteContent {
    fn default() -> Self {
        let link = |label: &str, href: &str| NavLink {
            label: label.to_string(),
            href: Some(href.to_string()),
            children: vec![],
        };
        let image = |src: &str, alt: &str| GalleryImage {
            src: src.to_string(),
            alt: alt.to_string(),
        };
        let faq = |question: &str, answer: &str| Faq {
            question: question.to_string(),
            answer: answer.to_string(),
        };
        let course = |value: &str, label: &str| Course {
            value: value.to_string(),
            label: label.to_string(),
        };

        Self {
            title: "Northfield Institute".to_string(),
            tagline: "Admissions are open for the spring intake.".to_string(),
            intro: "Small classes, practical projects and mentors from industry. \
                    Read the [FAQ](#faq) or go straight to the [application](#apply)."
                .to_string(),
            placeholder: "images/placeholder.svg".to_string(),
            nav: vec![
                link("About", "#about"),
                NavLink {
                    label: "Programs".to_string(),
                    href: None,
                    children: vec![
                        link("Web Development", "#apply"),
                        link("Graphic Design", "#apply"),
                        link("Digital Marketing", "#apply"),
                    ],
                },
                NavLink {
                    label: "Campus".to_string(),
                    href: None,
                    children: vec![link("Gallery", "#gallery"), link("FAQ", "#faq")],
                },
                link("Apply", "#apply"),
            ],
            gallery: vec![
                image("images/computer-lab.jpg", "Computer lab"),
                image("images/library.jpg", "Library reading room"),
                image("images/design-studio.jpg", "Design studio"),
                image("images/courtyard.jpg", "Main courtyard"),
            ],
            faqs: vec![
                faq(
                    "Who can apply?",
                    "Anyone who has completed **secondary school** or an equivalent.",
                ),
                faq(
                    "How long are the programs?",
                    "Each program runs for *six months*, with classes three days a week.",
                ),
                faq(
                    "Is there an entry test?",
                    "No. Applications are reviewed and shortlisted applicants are invited \
                     for a short interview.",
                ),
            ],
            courses: vec![
                course("web-development", "Web Development"),
                course("graphic-design", "Graphic Design"),
                course("digital-marketing", "Digital Marketing"),
            ],
        }
    }
}

/// Load content from a TOML file. Sections absent from the file keep the demo content.
pub fn load_content(path: &Path) -> Result<SiteContent, SiteError> {
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

/// Markdown to HTML.
fn markdown(source: &str) -> PreEscaped<String> {
    let mut out = String::new();
    md_html::push_html(&mut out, Parser::new(source));
    PreEscaped(out)
}

/// Escape text for use inside an attribute value.
fn escape_attr(value: &str) -> String {
    html! { (value) }.into_string()
}

/// Base styles: visibility classes only, named after the markup config.
fn base_css(markup: &MarkupConfig) -> String {
    format!(
        ".{hidden} {{ display: none; }}\n\
         .{list}, .{sub} {{ display: none; }}\n\
         .{list}.{open}, .{sub}.{open} {{ display: block; }}\n\
         .{panel} {{ display: none; }}\n",
        hidden = markup.hidden_class,
        list = markup.nav_list_class,
        sub = markup.submenu_list_class,
        open = markup.open_class,
        panel = markup.accordion_panel_class,
    )
}

/// Render the full page.
pub fn render_page(content: &SiteContent, config: &BehaviorConfig) -> Markup {
    let markup = &config.markup;
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (content.title) }
                style { (PreEscaped(base_css(markup))) }
            }
            body {
                (render_header(content, markup))
                main {
                    section id="about" {
                        h1 { (content.title) }
                        p.tagline { (content.tagline) }
                        (markdown(&content.intro))
                    }
                    (render_gallery(content, markup))
                    (render_faq(&content.faqs, markup))
                    (render_form(&content.courses, markup))
                }
                footer {
                    "© " span id=(markup.year_id) {} " " (content.title)
                }
            }
        }
    }
}

fn render_header(content: &SiteContent, markup: &MarkupConfig) -> Markup {
    html! {
        header.site-header {
            a.brand href="#about" { (content.title) }
            button id=(markup.hamburger_id) type="button" aria-expanded="false" aria-label="Menu" {
                "☰"
            }
            nav {
                ul class=(markup.nav_list_class) {
                    @for link in &content.nav {
                        (render_nav_link(link, markup))
                    }
                }
            }
        }
    }
}

fn render_nav_link(link: &NavLink, markup: &MarkupConfig) -> Markup {
    html! {
        @if link.children.is_empty() {
            li {
                a href=(link.href.as_deref().unwrap_or("#")) { (link.label) }
            }
        } @else {
            li class=(markup.submenu_group_class) {
                button class=(markup.submenu_button_class) type="button" aria-expanded="false" {
                    (link.label)
                }
                ul class=(markup.submenu_list_class) {
                    @for child in &link.children {
                        li {
                            a href=(child.href.as_deref().unwrap_or("#")) { (child.label) }
                        }
                    }
                }
            }
        }
    }
}

fn render_gallery(content: &SiteContent, markup: &MarkupConfig) -> Markup {
    // The pending-source attribute name is configurable, which the html!
    // attribute syntax cannot express, so each image is written by hand.
    let image = |img: &GalleryImage| {
        PreEscaped(format!(
            r#"<img class="{}" src="{}" {}="{}" alt="{}" loading="lazy">"#,
            escape_attr(&markup.gallery_item_class),
            escape_attr(&content.placeholder),
            escape_attr(&markup.pending_src_attr),
            escape_attr(&img.src),
            escape_attr(&img.alt),
        ))
    };

    html! {
        section id="gallery" {
            h2 { "Campus" }
            div id=(markup.gallery_grid_id) {
                @for img in &content.gallery {
                    (image(img))
                }
            }
            div id=(markup.lightbox_id) class={ "lightbox " (markup.hidden_class) }
                role="dialog" aria-hidden="true" {
                button id=(markup.lightbox_close_id) type="button" aria-label="Close" { "×" }
                img id=(markup.lightbox_image_id) src="" alt="";
                p id=(markup.lightbox_caption_id) {}
            }
        }
    }
}

fn render_faq(faqs: &[Faq], markup: &MarkupConfig) -> Markup {
    html! {
        section id="faq" {
            h2 { "Frequently asked questions" }
            @for faq in faqs {
                button class=(markup.accordion_button_class) type="button" { (faq.question) }
                div class=(markup.accordion_panel_class) {
                    (markdown(&faq.answer))
                }
            }
        }
    }
}

fn render_form(courses: &[Course], markup: &MarkupConfig) -> Markup {
    html! {
        section id="apply" {
            h2 { "Apply" }
            form id=(markup.form_id) novalidate {
                label for="applicant-name" { "Full name" }
                input id="applicant-name" name="name" type="text" autocomplete="name";
                label for="applicant-email" { "Email" }
                input id="applicant-email" name="email" type="email" autocomplete="email";
                label for="applicant-phone" { "Phone" }
                input id="applicant-phone" name="phone" type="tel" autocomplete="tel";
                label for="applicant-course" { "Course" }
                select id="applicant-course" name="course" {
                    option value="" { "Select a course" }
                    @for course in courses {
                        option value=(course.value) { (course.label) }
                    }
                }
                button type="submit" { "Send application" }
                button id=(markup.form_clear_id) type="button" { "Clear" }
            }
            p id=(markup.form_status_id) role="status" {}
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Rendering of a parsed [`Project`] into the `.vcxproj` and
//! `.vcxproj.filters` documents.
//!
//! Both documents are built as a small element tree and written with
//! two-space indentation and `\r\n` line ends, the layout Visual Studio
//! produces.  The text is read back with `roxmltree` before it is returned,
//! so a document that is not well-formed never reaches the disk.

use std::borrow::Cow;

use crate::error::{ConvertError, ConvertResult};
use crate::filters::{ResolvedFilter, resolve};
use crate::ids::{GuidSource, braced};
use crate::model::{FileKind, Project, ProjectConfiguration, Property, SourceFile};
use crate::options::ConvertOptions;

const NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";
const NEWLINE: &str = "\r\n";
const DECLARATION: &str = r#"<?xml version="1.0" encoding="utf-8"?>"#;

const DEFAULT_PROPS: &str = r"$(VCTargetsPath)\Microsoft.Cpp.Default.props";
const CPP_PROPS: &str = r"$(VCTargetsPath)\Microsoft.Cpp.props";
const CPP_TARGETS: &str = r"$(VCTargetsPath)\Microsoft.Cpp.targets";
const USER_PROPS: &str = r"$(UserRootDir)\Microsoft.Cpp.$(Platform).user.props";

/// The two generated documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedProject {
    /// `.vcxproj` text.
    pub project: String,
    /// `.vcxproj.filters` text.
    pub filters: String,
}

impl ConvertedProject {
    /// Write the project to `path` and the filters beside it at
    /// `<path>.filters`.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> ConvertResult<()> {
        let path = path.as_ref();
        let mut filters_path = path.as_os_str().to_owned();
        filters_path.push(".filters");
        std::fs::write(path, &self.project)?;
        std::fs::write(filters_path, &self.filters)?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Element tree
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct Element {
    name: &'static str,
    attributes: Vec<(&'static str, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    fn new(name: &'static str) -> Self {
        Self { name, attributes: Vec::new(), text: None, children: Vec::new() }
    }

    fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    fn push(&mut self, child: Element) {
        self.children.push(child);
    }

    fn render(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&indent);
        out.push('<');
        out.push_str(self.name);
        for (name, value) in &self.attributes {
            out.push_str(&format!(" {name}=\"{}\"", escape(value, true)));
        }

        match (&self.text, self.children.is_empty()) {
            (Some(text), _) => {
                out.push_str(&format!(">{}</{}>", escape(text, false), self.name));
            }
            (None, true) => out.push_str(" />"),
            (None, false) => {
                out.push('>');
                for child in &self.children {
                    out.push_str(NEWLINE);
                    child.render(out, depth + 1);
                }
                out.push_str(NEWLINE);
                out.push_str(&indent);
                out.push_str(&format!("</{}>", self.name));
            }
        }
    }
}

fn escape(text: &str, attribute: bool) -> Cow<'_, str> {
    let needs = |c: char| matches!(c, '&' | '<' | '>') || (attribute && c == '"');
    if !text.contains(needs) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn document(root: &Element, name: &'static str) -> ConvertResult<String> {
    let mut out = String::from(DECLARATION);
    out.push_str(NEWLINE);
    root.render(&mut out, 0);
    out.push_str(NEWLINE);
    roxmltree::Document::parse(&out).map_err(|source| ConvertError::MalformedOutput { document: name, source })?;
    Ok(out)
}

fn block(name: &'static str, properties: Vec<Property>) -> Element {
    properties
        .into_iter()
        .fold(Element::new(name), |el, (tag, value)| el.child(Element::new(tag).text(value)))
}

fn import(project: &str) -> Element {
    Element::new("Import").attr("Project", project)
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Documents
// ═══════════════════════════════════════════════════════════════════════════════

/// Render both documents.  The project GUID is drawn from `guids` first,
/// then one GUID per custom folder group.
pub fn render(
    project: &Project,
    options: &ConvertOptions,
    guids: &mut dyn GuidSource,
) -> ConvertResult<ConvertedProject> {
    let project_guid = guids.next_guid();
    let filters = resolve(&project.filters, guids);

    let vcxproj = project_document(project, options, &braced(&project_guid));
    let filters = filters_document(project, options, &filters);
    Ok(ConvertedProject {
        project: document(&vcxproj, "project")?,
        filters: document(&filters, "filters")?,
    })
}

fn project_document(project: &Project, options: &ConvertOptions, guid: &str) -> Element {
    let configurations = &project.configurations;
    let mut root = Element::new("Project")
        .attr("ToolsVersion", options.version())
        .attr("xmlns", NAMESPACE);

    let mut list = Element::new("ItemGroup").attr("Label", "ProjectConfigurations");
    for config in configurations {
        list.push(
            Element::new("ProjectConfiguration")
                .attr("Include", config.include())
                .child(Element::new("Configuration").text(&config.configuration))
                .child(Element::new("Platform").text(&config.platform)),
        );
    }
    root.push(list);

    let mut globals = Element::new("PropertyGroup")
        .attr("Label", "Globals")
        .child(Element::new("ProjectGuid").text(guid))
        .child(Element::new("Keyword").text("Win32Proj"));
    if !project.root_namespace.trim().is_empty() {
        globals.push(Element::new("RootNamespace").text(&project.root_namespace));
    }
    root.push(globals);
    root.push(import(DEFAULT_PROPS));

    for config in configurations {
        let props = &config.properties;
        let mut general = vec![];
        if let Some(kind) = project.configuration_type {
            general.push(("ConfigurationType", kind.as_str().to_string()));
        }
        general.extend(props.general());
        root.push(block("PropertyGroup", general).attr("Condition", &props.condition).attr("Label", "Configuration"));
    }
    root.push(import(CPP_PROPS));

    for config in configurations {
        root.push(
            Element::new("ImportGroup")
                .attr("Condition", &config.properties.condition)
                .attr("Label", "PropertySheets")
                .child(
                    import(USER_PROPS)
                        .attr("Condition", format!("exists('{USER_PROPS}')"))
                        .attr("Label", "LocalAppDataPlatform"),
                ),
        );
    }
    for config in configurations {
        let props = &config.properties;
        root.push(block("PropertyGroup", props.directories()).attr("Condition", &props.condition));
    }
    for config in configurations {
        let props = &config.properties;
        let mut definitions = Element::new("ItemDefinitionGroup").attr("Condition", &props.condition);
        for (name, properties) in props.tool_blocks() {
            if !properties.is_empty() {
                definitions.push(block(name, properties));
            }
        }
        root.push(definitions);
    }

    for kind in FileKind::RENDER_ORDER {
        let mut group = Element::new("ItemGroup");
        for file in project.files.iter().filter(|f| f.kind == kind) {
            group.push(project_entry(file, configurations));
        }
        if !group.children.is_empty() {
            root.push(group);
        }
    }

    root.push(import(CPP_TARGETS));
    root
}

/// A file in the project document: its per-configuration overrides, each
/// tagged with the configuration's condition.
fn project_entry(file: &SourceFile, configurations: &[ProjectConfiguration]) -> Element {
    let mut entry = Element::new(file.kind.element_name()).attr("Include", &file.path);
    for (variant, config) in file.variants.iter().zip(configurations) {
        for (tag, value) in variant.properties() {
            entry.push(Element::new(tag).attr("Condition", &config.properties.condition).text(value));
        }
    }
    entry
}

/// A file in the filters document: its folder and nothing else.
fn filter_entry(file: &SourceFile, folder: &str) -> Element {
    Element::new(file.kind.element_name())
        .attr("Include", &file.path)
        .child(Element::new("Filter").text(folder))
}

fn filters_document(project: &Project, options: &ConvertOptions, filters: &[ResolvedFilter]) -> Element {
    let mut root = Element::new("Project")
        .attr("DefaultTargets", "Build")
        .attr("ToolsVersion", options.version())
        .attr("xmlns", NAMESPACE);

    let mut nodes = Element::new("ItemGroup");
    for filter in filters {
        let mut node = Element::new("Filter").attr("Include", &filter.path);
        if let Some(extensions) = filter.extensions.as_deref().filter(|e| !e.trim().is_empty()) {
            node.push(Element::new("Extensions").text(extensions));
        }
        node.push(Element::new("UniqueIdentifier").text(braced(&filter.id)));
        nodes.push(node);
    }
    root.push(nodes);

    for kind in FileKind::RENDER_ORDER {
        let mut group = Element::new("ItemGroup");
        for file in project.files.iter().filter(|f| f.kind == kind) {
            if let Some(folder) = &file.filter {
                group.push(filter_entry(file, folder));
            }
        }
        if !group.children.is_empty() {
            root.push(group);
        }
    }
    root
}

//! Folder groups (`# Begin Group` / `# End Group`) and their resolution into
//! `.vcxproj.filters` nodes.

use indexmap::IndexSet;
use uuid::{Uuid, uuid};

use crate::ids::GuidSource;

/// A closed folder group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Backslash-joined path from the outermost group: `Source Files\Parser`.
    pub path: String,
    /// `# PROP Default_Filter` value declared inside the group.
    pub extensions: Option<String>,
}

impl Filter {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), extensions: None }
    }
}

/// The open groups, innermost last, and the groups closed so far.
#[derive(Debug, Clone, Default)]
pub struct GroupStack {
    open: Vec<Filter>,
    closed: Vec<Filter>,
}

impl GroupStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `name` beneath the current group.
    pub fn open(&mut self, name: &str) {
        let path = match self.open.last() {
            Some(parent) => format!("{}\\{name}", parent.path),
            None => name.to_string(),
        };
        tracing::debug!(group = %path, "open group");
        self.open.push(Filter::new(path));
    }

    /// Close the innermost group.  Returns `false` when nothing is open.
    pub fn close(&mut self) -> bool {
        match self.open.pop() {
            Some(filter) => {
                tracing::debug!(group = %filter.path, "close group");
                self.closed.push(filter);
                true
            }
            None => false,
        }
    }

    /// Path of the innermost open group.
    pub fn current(&self) -> Option<&str> {
        self.open.last().map(|f| f.path.as_str())
    }

    /// Record declared extensions on the innermost open group.
    pub fn set_extensions(&mut self, extensions: &str) {
        if extensions.is_empty() {
            return;
        }
        if let Some(top) = self.open.last_mut() {
            top.extensions = Some(extensions.to_string());
        }
    }

    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Closed groups in close order.  Groups still open are dropped.
    pub fn finish(self) -> Vec<Filter> {
        for unclosed in &self.open {
            tracing::warn!(group = %unclosed.path, "group never closed; dropped");
        }
        self.closed
    }
}

/// A group that carries a fixed identity in every Visual Studio project.
struct WellKnownGroup {
    name: &'static str,
    extensions: &'static str,
    id: Uuid,
}

const WELL_KNOWN_GROUPS: [WellKnownGroup; 3] = [
    WellKnownGroup {
        name: "Source Files",
        extensions: "cpp;c;cc;cxx;c++;cppm;ixx;def;odl;idl;hpj;bat;asm;asmx",
        id: uuid!("4FC737F1-C7A5-4376-A066-2A32D752A2FF"),
    },
    WellKnownGroup {
        name: "Header Files",
        extensions: "h;hh;hpp;hxx;h++;hm;inl;inc;ipp;xsd",
        id: uuid!("93995380-89BD-4b04-88EB-625FBE52EBFB"),
    },
    WellKnownGroup {
        name: "Resource Files",
        extensions: "rc;ico;cur;bmp;dlg;rc2;rct;bin;rgs;gif;jpg;jpeg;jpe;resx;tiff;tif;png;wav;mfcribbon-ms",
        id: uuid!("67DA6AB6-F800-4c08-8B7A-83BB121AAD01"),
    },
];

/// A filter node ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilter {
    pub path: String,
    pub extensions: Option<String>,
    pub id: Uuid,
}

/// Assign identities.  Well-known top-level groups get their canonical
/// extensions and GUIDs; every other group a fresh GUID.  A path closed more
/// than once is written once, with the first declaration's extensions.
pub fn resolve(filters: &[Filter], guids: &mut dyn GuidSource) -> Vec<ResolvedFilter> {
    let mut seen = IndexSet::new();
    let mut resolved = Vec::with_capacity(filters.len());
    for filter in filters {
        if !seen.insert(filter.path.as_str()) {
            continue;
        }
        let node = match WELL_KNOWN_GROUPS.iter().find(|g| g.name == filter.path) {
            Some(group) => ResolvedFilter {
                path: filter.path.clone(),
                extensions: Some(group.extensions.to_string()),
                id: group.id,
            },
            None => ResolvedFilter {
                path: filter.path.clone(),
                extensions: filter.extensions.clone(),
                id: guids.next_guid(),
            },
        };
        resolved.push(node);
    }
    resolved
}

//! Which property bags a decoded line applies to.
//!
//! | branch | file | target                                              |
//! |--------|------|-----------------------------------------------------|
//! | no     | no   | every configuration's project-wide bag              |
//! | no     | yes  | every configuration's variant of the current file   |
//! | yes    | no   | the branch configuration's project-wide bag         |
//! | yes    | yes  | the branch configuration's variant of the file      |
//!
//! Tools without a per-file bag (linker, librarian, build events, custom
//! build, configuration properties) always use the configuration rows.

use std::ops::Range;

use crate::model::{ClCompile, ConfigurationProperties, Lib, Link, ProjectConfiguration, ResourceCompile, SourceFile};
use crate::options::ConvertOptions;

/// Configuration indices selected by the current branch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSet {
    All,
    One(usize),
}

impl TargetSet {
    pub fn resolve(branch: Option<usize>) -> Self {
        branch.map_or(TargetSet::All, TargetSet::One)
    }

    pub fn indices(self, len: usize) -> Range<usize> {
        match self {
            TargetSet::All => 0..len,
            TargetSet::One(i) if i < len => i..i + 1,
            TargetSet::One(_) => 0..0,
        }
    }
}

/// Resolved write targets for one line, plus the configuration that
/// conditional defaults are judged against.
pub struct Targets<'s> {
    configurations: &'s mut [ProjectConfiguration],
    file: Option<&'s mut SourceFile>,
    set: TargetSet,
    reference: Option<usize>,
    options: &'s ConvertOptions,
}

impl<'s> Targets<'s> {
    pub fn new(
        configurations: &'s mut [ProjectConfiguration],
        file: Option<&'s mut SourceFile>,
        set: TargetSet,
        reference: Option<usize>,
        options: &'s ConvertOptions,
    ) -> Self {
        Self { configurations, file, set, reference, options }
    }

    /// A source file is being declared; per-file bags are targeted.
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn options(&self) -> &ConvertOptions {
        self.options
    }

    fn reference(&self) -> Option<&ProjectConfiguration> {
        self.reference.and_then(|i| self.configurations.get(i))
    }

    /// Whether the reference configuration links the debug runtime.
    pub fn is_debug(&self) -> bool {
        self.reference()
            .is_some_and(|c| c.properties.debug_libraries())
    }

    /// Whether the reference configuration builds for the default platform.
    /// With no configurations declared the default platform is assumed.
    pub fn is_default_platform(&self) -> bool {
        self.reference()
            .is_none_or(|c| c.platform == self.options.platform())
    }

    pub fn for_each_compiler(&mut self, mut apply: impl FnMut(&mut ClCompile)) {
        match self.file.as_deref_mut() {
            Some(file) => {
                for i in self.set.indices(file.variants.len()) {
                    if let Some(cl) = file.variants[i].compiler_mut() {
                        apply(cl);
                    }
                }
            }
            None => {
                for i in self.set.indices(self.configurations.len()) {
                    apply(&mut self.configurations[i].properties.cl_compile);
                }
            }
        }
    }

    pub fn for_each_resource(&mut self, mut apply: impl FnMut(&mut ResourceCompile)) {
        match self.file.as_deref_mut() {
            Some(file) => {
                for i in self.set.indices(file.variants.len()) {
                    if let Some(rc) = file.variants[i].resource_mut() {
                        apply(rc);
                    }
                }
            }
            None => {
                for i in self.set.indices(self.configurations.len()) {
                    apply(&mut self.configurations[i].properties.resource_compile);
                }
            }
        }
    }

    pub fn for_each_configuration(&mut self, mut apply: impl FnMut(&mut ConfigurationProperties)) {
        for i in self.set.indices(self.configurations.len()) {
            apply(&mut self.configurations[i].properties);
        }
    }

    pub fn for_each_link(&mut self, mut apply: impl FnMut(&mut Link)) {
        self.for_each_configuration(|p| apply(&mut p.link));
    }

    pub fn for_each_lib(&mut self, mut apply: impl FnMut(&mut Lib)) {
        self.for_each_configuration(|p| apply(&mut p.lib));
    }
}

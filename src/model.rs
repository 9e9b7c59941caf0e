//! Property model of the generated `.vcxproj`.
//!
//! Every tool block (`ClCompile`, `Link`, `Lib`, `ResourceCompile`) is a bag
//! of optional values.  `None` means "leave the MSBuild default alone"; the
//! flag decoders never store a value equal to the default, so anything that is
//! `Some` here is an override that must be written out.
//!
//! Output element names are fixed by the `visible_properties!` tables below,
//! in the order Visual Studio shows them in its property pages.

use indexmap::IndexSet;

use crate::filters::Filter;

// ═══════════════════════════════════════════════════════════════════════════════
//  Value types
// ═══════════════════════════════════════════════════════════════════════════════

/// A property value that can be turned into element text, or hidden when it
/// carries no override.
pub trait PropertyValue {
    fn visible(&self, name: &'static str) -> Option<String>;
}

impl PropertyValue for Option<String> {
    fn visible(&self, _name: &'static str) -> Option<String> {
        self.as_ref()
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}

impl PropertyValue for Option<bool> {
    fn visible(&self, _name: &'static str) -> Option<String> {
        self.map(|v| if v { "true" } else { "false" }.to_string())
    }
}

macro_rules! string_set {
    ($(#[$meta:meta])* $name:ident, $sep:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name(IndexSet<String>);

        impl $name {
            /// Append `value` unless it is already present.
            pub fn insert(&mut self, value: impl Into<String>) -> bool {
                self.0.insert(value.into())
            }

            pub fn contains(&self, value: &str) -> bool {
                self.0.contains(value)
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn iter(&self) -> impl Iterator<Item = &str> {
                self.0.iter().map(String::as_str)
            }
        }

        impl PropertyValue for $name {
            /// Joined values followed by the inherited `%(Name)` reference.
            fn visible(&self, name: &'static str) -> Option<String> {
                if self.0.is_empty() {
                    return None;
                }
                let mut out = String::new();
                for v in &self.0 {
                    out.push_str(v);
                    out.push($sep);
                }
                out.push_str(&format!("%({name})"));
                Some(out)
            }
        }

        impl<S: Into<String>> FromIterator<S> for $name {
            fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
                Self(iter.into_iter().map(Into::into).collect())
            }
        }
    };
}

string_set!(
    /// A `;`-separated MSBuild item list (definitions, directories, libraries).
    ItemList,
    ';'
);

string_set!(
    /// Verbatim command-line switches, space separated.
    OptionList,
    ' '
);

/// A rendered property: element name and text.
pub type Property = (&'static str, String);

/// Build the ordered list of visible properties from `"Tag" => value` pairs.
macro_rules! visible_properties {
    ($( $tag:literal => $value:expr ),* $(,)?) => {{
        let mut props: Vec<Property> = Vec::new();
        $(
            if let Some(text) = PropertyValue::visible(&$value, $tag) {
                props.push(($tag, text));
            }
        )*
        props
    }};
}

/// Import libraries every Win32 project links by default.  They are dropped
/// from dependency lists unless default libraries are ignored.
pub const DEFAULT_LINK_LIBRARIES: [&str; 12] = [
    "kernel32.lib",
    "user32.lib",
    "gdi32.lib",
    "winspool.lib",
    "comdlg32.lib",
    "advapi32.lib",
    "shell32.lib",
    "ole32.lib",
    "oleaut32.lib",
    "uuid.lib",
    "odbc32.lib",
    "odbccp32.lib",
];

fn without_default_libraries(deps: &ItemList, ignore_all: Option<bool>) -> ItemList {
    if ignore_all == Some(true) {
        return deps.clone();
    }
    deps.iter()
        .filter(|d| !DEFAULT_LINK_LIBRARIES.contains(d))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tool property bags
// ═══════════════════════════════════════════════════════════════════════════════

// ─── ClCompile ───────────────────────────────────────────────────────────────

/// C/C++ compiler settings, project-wide or for one source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClCompile {
    pub excluded_from_build: Option<bool>,
    pub additional_include_directories: ItemList,
    pub debug_information_format: Option<String>,
    pub suppress_startup_banner: Option<bool>,
    pub warning_level: Option<String>,
    pub treat_warning_as_error: Option<bool>,
    pub optimization: Option<String>,
    pub inline_function_expansion: Option<String>,
    pub intrinsic_functions: Option<bool>,
    pub favor_size_or_speed: Option<String>,
    pub omit_frame_pointers: Option<bool>,
    pub enable_fiber_safe_optimizations: Option<bool>,
    pub preprocessor_definitions: ItemList,
    pub undefine_preprocessor_definitions: ItemList,
    pub undefine_all_preprocessor_definitions: Option<bool>,
    pub ignore_standard_include_path: Option<bool>,
    pub preprocess_to_file: Option<bool>,
    pub preprocess_suppress_line_numbers: Option<bool>,
    pub preprocess_keep_comments: Option<bool>,
    pub string_pooling: Option<bool>,
    pub exception_handling: Option<String>,
    pub basic_runtime_checks: Option<String>,
    pub runtime_library: Option<String>,
    pub struct_member_alignment: Option<String>,
    pub function_level_linking: Option<bool>,
    pub disable_language_extensions: Option<bool>,
    pub runtime_type_info: Option<bool>,
    pub precompiled_header: Option<String>,
    pub precompiled_header_file: Option<String>,
    pub precompiled_header_output_file: Option<String>,
    pub assembler_output: Option<String>,
    pub assembler_listing_location: Option<String>,
    pub object_file_name: Option<String>,
    pub program_data_base_file_name: Option<String>,
    pub browse_information: Option<bool>,
    pub browse_information_file: Option<String>,
    pub calling_convention: Option<String>,
    pub compile_as: Option<String>,
    pub forced_include_files: ItemList,
    pub omit_default_lib_name: Option<bool>,
    pub additional_options: OptionList,
}

impl ClCompile {
    pub fn properties(&self) -> Vec<Property> {
        visible_properties!(
            "ExcludedFromBuild" => self.excluded_from_build,
            "AdditionalIncludeDirectories" => self.additional_include_directories,
            "DebugInformationFormat" => self.debug_information_format,
            "SuppressStartupBanner" => self.suppress_startup_banner,
            "WarningLevel" => self.warning_level,
            "TreatWarningAsError" => self.treat_warning_as_error,
            "Optimization" => self.optimization,
            "InlineFunctionExpansion" => self.inline_function_expansion,
            "IntrinsicFunctions" => self.intrinsic_functions,
            "FavorSizeOrSpeed" => self.favor_size_or_speed,
            "OmitFramePointers" => self.omit_frame_pointers,
            "EnableFiberSafeOptimizations" => self.enable_fiber_safe_optimizations,
            "PreprocessorDefinitions" => self.preprocessor_definitions,
            "UndefinePreprocessorDefinitions" => self.undefine_preprocessor_definitions,
            "UndefineAllPreprocessorDefinitions" => self.undefine_all_preprocessor_definitions,
            "IgnoreStandardIncludePath" => self.ignore_standard_include_path,
            "PreprocessToFile" => self.preprocess_to_file,
            "PreprocessSuppressLineNumbers" => self.preprocess_suppress_line_numbers,
            "PreprocessKeepComments" => self.preprocess_keep_comments,
            "StringPooling" => self.string_pooling,
            "ExceptionHandling" => self.exception_handling,
            "BasicRuntimeChecks" => self.basic_runtime_checks,
            "RuntimeLibrary" => self.runtime_library,
            "StructMemberAlignment" => self.struct_member_alignment,
            "FunctionLevelLinking" => self.function_level_linking,
            "DisableLanguageExtensions" => self.disable_language_extensions,
            "RuntimeTypeInfo" => self.runtime_type_info,
            "PrecompiledHeader" => self.precompiled_header,
            "PrecompiledHeaderFile" => self.precompiled_header_file,
            "PrecompiledHeaderOutputFile" => self.precompiled_header_output_file,
            "AssemblerOutput" => self.assembler_output,
            "AssemblerListingLocation" => self.assembler_listing_location,
            "ObjectFileName" => self.object_file_name,
            "ProgramDataBaseFileName" => self.program_data_base_file_name,
            "BrowseInformation" => self.browse_information,
            "BrowseInformationFile" => self.browse_information_file,
            "CallingConvention" => self.calling_convention,
            "CompileAs" => self.compile_as,
            "ForcedIncludeFiles" => self.forced_include_files,
            "OmitDefaultLibName" => self.omit_default_lib_name,
            "AdditionalOptions" => self.additional_options,
        )
    }
}

// ─── ResourceCompile ─────────────────────────────────────────────────────────

/// Resource compiler settings, project-wide or for one `.rc` file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceCompile {
    pub preprocessor_definitions: ItemList,
    pub undefine_preprocessor_definitions: ItemList,
    pub culture: Option<String>,
    pub additional_include_directories: ItemList,
    pub ignore_standard_include_path: Option<bool>,
    pub show_progress: Option<bool>,
    pub resource_output_file_name: Option<String>,
    pub null_terminate_strings: Option<bool>,
    pub additional_options: OptionList,
}

impl ResourceCompile {
    pub fn properties(&self) -> Vec<Property> {
        visible_properties!(
            "PreprocessorDefinitions" => self.preprocessor_definitions,
            "UndefinePreprocessorDefinitions" => self.undefine_preprocessor_definitions,
            "Culture" => self.culture,
            "AdditionalIncludeDirectories" => self.additional_include_directories,
            "IgnoreStandardIncludePath" => self.ignore_standard_include_path,
            "ShowProgress" => self.show_progress,
            "ResourceOutputFileName" => self.resource_output_file_name,
            "NullTerminateStrings" => self.null_terminate_strings,
            "AdditionalOptions" => self.additional_options,
        )
    }
}

// ─── Link ────────────────────────────────────────────────────────────────────

/// Linker settings for one configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Link {
    pub output_file: Option<String>,
    pub show_progress: Option<String>,
    pub version: Option<String>,
    pub link_incremental: Option<bool>,
    pub suppress_startup_banner: Option<bool>,
    pub additional_library_directories: ItemList,
    pub force_file_output: Option<String>,
    pub specify_section_attributes: Option<String>,
    pub additional_dependencies: ItemList,
    pub ignore_all_default_libraries: Option<bool>,
    pub ignore_specific_default_libraries: ItemList,
    pub module_definition_file: Option<String>,
    pub force_symbol_references: ItemList,
    pub delay_load_dlls: ItemList,
    pub generate_debug_information: Option<bool>,
    pub program_database_file: Option<String>,
    pub generate_map_file: Option<bool>,
    pub map_file_name: Option<String>,
    pub map_exports: Option<bool>,
    pub sub_system: Option<String>,
    pub heap_reserve_size: Option<String>,
    pub heap_commit_size: Option<String>,
    pub stack_reserve_size: Option<String>,
    pub stack_commit_size: Option<String>,
    pub large_address_aware: Option<bool>,
    pub swap_run_from_cd: Option<bool>,
    pub swap_run_from_net: Option<bool>,
    pub driver: Option<String>,
    pub optimize_references: Option<bool>,
    pub enable_comdat_folding: Option<bool>,
    pub function_order: Option<String>,
    pub entry_point_symbol: Option<String>,
    pub no_entry_point: Option<bool>,
    pub set_checksum: Option<bool>,
    pub base_address: Option<String>,
    pub fixed_base_address: Option<bool>,
    pub support_unload_of_delay_loaded_dll: Option<bool>,
    pub support_nobind_of_delay_loaded_dll: Option<bool>,
    pub import_library: Option<String>,
    pub merge_sections: Option<String>,
    pub target_machine: Option<String>,
    pub profile: Option<bool>,
    pub section_alignment: Option<String>,
    pub msdos_stub_file_name: Option<String>,
    pub additional_options: OptionList,
}

impl Link {
    /// Dependencies as they will be written: the default Win32 import
    /// libraries are inherited from the toolset and dropped here.
    pub fn visible_dependencies(&self) -> ItemList {
        without_default_libraries(&self.additional_dependencies, self.ignore_all_default_libraries)
    }

    pub fn properties(&self) -> Vec<Property> {
        let dependencies = self.visible_dependencies();
        visible_properties!(
            "OutputFile" => self.output_file,
            "ShowProgress" => self.show_progress,
            "Version" => self.version,
            "LinkIncremental" => self.link_incremental,
            "SuppressStartupBanner" => self.suppress_startup_banner,
            "AdditionalLibraryDirectories" => self.additional_library_directories,
            "ForceFileOutput" => self.force_file_output,
            "SpecifySectionAttributes" => self.specify_section_attributes,
            "AdditionalDependencies" => dependencies,
            "IgnoreAllDefaultLibraries" => self.ignore_all_default_libraries,
            "IgnoreSpecificDefaultLibraries" => self.ignore_specific_default_libraries,
            "ModuleDefinitionFile" => self.module_definition_file,
            "ForceSymbolReferences" => self.force_symbol_references,
            "DelayLoadDLLs" => self.delay_load_dlls,
            "GenerateDebugInformation" => self.generate_debug_information,
            "ProgramDatabaseFile" => self.program_database_file,
            "GenerateMapFile" => self.generate_map_file,
            "MapFileName" => self.map_file_name,
            "MapExports" => self.map_exports,
            "SubSystem" => self.sub_system,
            "HeapReserveSize" => self.heap_reserve_size,
            "HeapCommitSize" => self.heap_commit_size,
            "StackReserveSize" => self.stack_reserve_size,
            "StackCommitSize" => self.stack_commit_size,
            "LargeAddressAware" => self.large_address_aware,
            "SwapRunFromCD" => self.swap_run_from_cd,
            "SwapRunFromNET" => self.swap_run_from_net,
            "Driver" => self.driver,
            "OptimizeReferences" => self.optimize_references,
            "EnableCOMDATFolding" => self.enable_comdat_folding,
            "FunctionOrder" => self.function_order,
            "EntryPointSymbol" => self.entry_point_symbol,
            "NoEntryPoint" => self.no_entry_point,
            "SetChecksum" => self.set_checksum,
            "BaseAddress" => self.base_address,
            "FixedBaseAddress" => self.fixed_base_address,
            "SupportUnloadOfDelayLoadedDLL" => self.support_unload_of_delay_loaded_dll,
            "SupportNobindOfDelayLoadedDLL" => self.support_nobind_of_delay_loaded_dll,
            "ImportLibrary" => self.import_library,
            "MergeSections" => self.merge_sections,
            "TargetMachine" => self.target_machine,
            "Profile" => self.profile,
            "SectionAlignment" => self.section_alignment,
            "MSDOSStubFileName" => self.msdos_stub_file_name,
            "AdditionalOptions" => self.additional_options,
        )
    }
}

// ─── Lib ─────────────────────────────────────────────────────────────────────

/// Librarian settings for one configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Lib {
    pub output_file: Option<String>,
    pub additional_dependencies: ItemList,
    pub additional_library_directories: ItemList,
    pub suppress_startup_banner: Option<bool>,
    pub module_definition_file: Option<String>,
    pub ignore_all_default_libraries: Option<bool>,
    pub ignore_specific_default_libraries: ItemList,
    pub export_named_functions: ItemList,
    pub force_symbol_references: Option<String>,
    pub target_machine: Option<String>,
    pub sub_system: Option<String>,
    pub remove_objects: ItemList,
    pub verbose: Option<bool>,
    pub name: Option<String>,
    pub additional_options: OptionList,
}

impl Lib {
    pub fn visible_dependencies(&self) -> ItemList {
        without_default_libraries(&self.additional_dependencies, self.ignore_all_default_libraries)
    }

    pub fn properties(&self) -> Vec<Property> {
        let dependencies = self.visible_dependencies();
        visible_properties!(
            "OutputFile" => self.output_file,
            "AdditionalDependencies" => dependencies,
            "AdditionalLibraryDirectories" => self.additional_library_directories,
            "SuppressStartupBanner" => self.suppress_startup_banner,
            "ModuleDefinitionFile" => self.module_definition_file,
            "IgnoreAllDefaultLibraries" => self.ignore_all_default_libraries,
            "IgnoreSpecificDefaultLibraries" => self.ignore_specific_default_libraries,
            "ExportNamedFunctions" => self.export_named_functions,
            "ForceSymbolReferences" => self.force_symbol_references,
            "TargetMachine" => self.target_machine,
            "SubSystem" => self.sub_system,
            "RemoveObjects" => self.remove_objects,
            "Verbose" => self.verbose,
            "Name" => self.name,
            "AdditionalOptions" => self.additional_options,
        )
    }
}

// ─── Build events ────────────────────────────────────────────────────────────

/// A pre-link or post-build event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildEvent {
    pub command: Option<String>,
    pub message: Option<String>,
}

impl BuildEvent {
    pub fn properties(&self) -> Vec<Property> {
        visible_properties!(
            "Command" => self.command,
            "Message" => self.message,
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomBuildStep {
    pub command: Option<String>,
    pub message: Option<String>,
    pub outputs: Option<String>,
}

impl CustomBuildStep {
    pub fn properties(&self) -> Vec<Property> {
        visible_properties!(
            "Command" => self.command,
            "Message" => self.message,
            "Outputs" => self.outputs,
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Configurations
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything that belongs to one `Configuration|Platform` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationProperties {
    /// `'$(Configuration)|$(Platform)'=='Debug|Win32'`, copied verbatim into
    /// every conditional element.
    pub condition: String,
    pub use_debug_libraries: Option<bool>,
    pub use_of_mfc: Option<String>,
    pub character_set: Option<String>,
    pub out_dir: Option<String>,
    pub int_dir: Option<String>,
    pub cl_compile: ClCompile,
    pub link: Link,
    pub lib: Lib,
    pub resource_compile: ResourceCompile,
    pub pre_link_event: BuildEvent,
    pub post_build_event: BuildEvent,
    pub custom_build_step: CustomBuildStep,
}

impl ConfigurationProperties {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            use_debug_libraries: None,
            use_of_mfc: None,
            character_set: None,
            out_dir: None,
            int_dir: None,
            cl_compile: ClCompile::default(),
            link: Link::default(),
            lib: Lib::default(),
            resource_compile: ResourceCompile::default(),
            pre_link_event: BuildEvent::default(),
            post_build_event: BuildEvent::default(),
            custom_build_step: CustomBuildStep::default(),
        }
    }

    /// Whether the configuration links the debug runtime.  Several compiler
    /// and linker defaults depend on this.
    pub fn debug_libraries(&self) -> bool {
        self.use_debug_libraries == Some(true)
    }

    /// Values of the `Configuration` property group, after `ConfigurationType`.
    pub fn general(&self) -> Vec<Property> {
        visible_properties!(
            "UseDebugLibraries" => self.use_debug_libraries,
            "UseOfMfc" => self.use_of_mfc,
            "CharacterSet" => self.character_set,
        )
    }

    pub fn directories(&self) -> Vec<Property> {
        visible_properties!(
            "OutDir" => self.out_dir,
            "IntDir" => self.int_dir,
        )
    }

    /// Tool blocks of the item definition group, in output order.
    pub fn tool_blocks(&self) -> [(&'static str, Vec<Property>); 7] {
        [
            ("ClCompile", self.cl_compile.properties()),
            ("Link", self.link.properties()),
            ("Lib", self.lib.properties()),
            ("ResourceCompile", self.resource_compile.properties()),
            ("PreLinkEvent", self.pre_link_event.properties()),
            ("PostBuildEvent", self.post_build_event.properties()),
            ("CustomBuildStep", self.custom_build_step.properties()),
        ]
    }
}

/// A declared `(platform, configuration)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfiguration {
    pub configuration: String,
    pub platform: String,
    pub properties: ConfigurationProperties,
}

impl ProjectConfiguration {
    pub fn new(configuration: impl Into<String>, platform: impl Into<String>) -> Self {
        let configuration = configuration.into();
        let platform = platform.into();
        let properties = ConfigurationProperties::new(format!(
            "'$(Configuration)|$(Platform)'=='{configuration}|{platform}'"
        ));
        Self { configuration, platform, properties }
    }

    /// Lookup key used by `!IF "$(CFG)" == ...` branches: `"Win32 Debug"`.
    pub fn key(&self) -> String {
        format!("{} {}", self.platform, self.configuration)
    }

    /// `Debug|Win32`, as used by `<ProjectConfiguration Include=...>`.
    pub fn include(&self) -> String {
        format!("{}|{}", self.configuration, self.platform)
    }
}

/// `<ConfigurationType>` from `# TARGTYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationType {
    Application,
    DynamicLibrary,
    StaticLibrary,
}

impl ConfigurationType {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0x0101 | 0x0103 => Some(Self::Application),
            0x0102 => Some(Self::DynamicLibrary),
            0x0104 => Some(Self::StaticLibrary),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application => "Application",
            Self::DynamicLibrary => "DynamicLibrary",
            Self::StaticLibrary => "StaticLibrary",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Source files
// ═══════════════════════════════════════════════════════════════════════════════

/// The item type a source file is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    ClCompile,
    None,
    ClInclude,
    ResourceCompile,
    Image,
    Text,
}

impl FileKind {
    /// Item groups are written in this order.
    pub const RENDER_ORDER: [FileKind; 6] = [
        FileKind::ClCompile,
        FileKind::None,
        FileKind::ClInclude,
        FileKind::ResourceCompile,
        FileKind::Image,
        FileKind::Text,
    ];

    pub fn from_path(path: &str) -> Self {
        let extension = file_extension(path).to_ascii_lowercase();
        match extension.as_str() {
            "bmp" | "ico" => FileKind::Image,
            "c" | "cpp" | "cxx" => FileKind::ClCompile,
            "h" | "hpp" | "hxx" => FileKind::ClInclude,
            "rc" => FileKind::ResourceCompile,
            "txt" => FileKind::Text,
            _ => FileKind::None,
        }
    }

    pub fn element_name(self) -> &'static str {
        match self {
            FileKind::ClCompile => "ClCompile",
            FileKind::None => "None",
            FileKind::ClInclude => "ClInclude",
            FileKind::ResourceCompile => "ResourceCompile",
            FileKind::Image => "Image",
            FileKind::Text => "Text",
        }
    }

    fn new_variant(self) -> FileVariant {
        match self {
            FileKind::ClCompile => FileVariant::Compile(ClCompile::default()),
            FileKind::None => FileVariant::None,
            FileKind::ClInclude => FileVariant::Include,
            FileKind::ResourceCompile => FileVariant::Resource(ResourceCompile::default()),
            FileKind::Image => FileVariant::Image,
            FileKind::Text => FileVariant::Text,
        }
    }
}

/// Extension of the last path component; both `\` and `/` separate.
fn file_extension(path: &str) -> &str {
    let name = path.rsplit(['\\', '/']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(dot) => &name[dot + 1..],
        None => "",
    }
}

/// Per-configuration data of one source file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileVariant {
    Compile(ClCompile),
    Include,
    Resource(ResourceCompile),
    Image,
    Text,
    None,
}

impl FileVariant {
    pub fn compiler_mut(&mut self) -> Option<&mut ClCompile> {
        match self {
            FileVariant::Compile(cl) => Some(cl),
            _ => None,
        }
    }

    pub fn resource_mut(&mut self) -> Option<&mut ResourceCompile> {
        match self {
            FileVariant::Resource(rc) => Some(rc),
            _ => None,
        }
    }

    /// Property overrides of this variant; empty for kinds without a tool.
    pub fn properties(&self) -> Vec<Property> {
        match self {
            FileVariant::Compile(cl) => cl.properties(),
            FileVariant::Resource(rc) => rc.properties(),
            _ => Vec::new(),
        }
    }
}

/// A `SOURCE=` entry with one variant per project configuration, indexed in
/// the same order as [`Project::configurations`].
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub path: String,
    pub kind: FileKind,
    /// Path of the folder group the file was declared in.
    pub filter: Option<String>,
    pub variants: Vec<FileVariant>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, filter: Option<String>, configurations: usize) -> Self {
        let path = path.into();
        let kind = FileKind::from_path(&path);
        let variants = (0..configurations).map(|_| kind.new_variant()).collect();
        Self { path, kind, filter, variants }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Project
// ═══════════════════════════════════════════════════════════════════════════════

/// The fully decoded project, ready to be rendered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub root_namespace: String,
    pub configuration_type: Option<ConfigurationType>,
    pub configurations: Vec<ProjectConfiguration>,
    pub files: Vec<SourceFile>,
    /// Folder groups in the order they were closed.
    pub filters: Vec<Filter>,
}

impl Project {
    /// Index of the configuration with the given `"<platform> <config>"` key.
    pub fn configuration_index(&self, key: &str) -> Option<usize> {
        self.configurations.iter().position(|c| c.key() == key)
    }

    pub fn configuration(&self, key: &str) -> Option<&ProjectConfiguration> {
        self.configuration_index(key).map(|i| &self.configurations[i])
    }

    pub fn file(&self, path: &str) -> Option<&SourceFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn names(props: &[Property]) -> Vec<&'static str> {
        props.iter().map(|(n, _)| *n).collect()
    }

    // ── Visibility ───────────────────────────────────────────────────────

    #[test]
    fn empty_bags_have_no_visible_properties() {
        assert!(ClCompile::default().properties().is_empty());
        assert!(Link::default().properties().is_empty());
        assert!(Lib::default().properties().is_empty());
        assert!(ResourceCompile::default().properties().is_empty());
        assert!(BuildEvent::default().properties().is_empty());
        assert!(CustomBuildStep::default().properties().is_empty());
    }

    #[test]
    fn blank_strings_are_hidden() {
        let cl = ClCompile { object_file_name: Some("  ".into()), ..Default::default() };
        assert!(cl.properties().is_empty());
    }

    #[test]
    fn false_booleans_are_visible() {
        let cl = ClCompile { suppress_startup_banner: Some(false), ..Default::default() };
        assert_eq!(
            cl.properties(),
            vec![("SuppressStartupBanner", "false".to_string())]
        );
    }

    #[test]
    fn item_lists_append_inherited_reference() {
        let mut cl = ClCompile::default();
        cl.preprocessor_definitions.insert("WIN32");
        cl.preprocessor_definitions.insert("NDEBUG");
        cl.preprocessor_definitions.insert("WIN32");
        assert_eq!(
            cl.properties(),
            vec![(
                "PreprocessorDefinitions",
                "WIN32;NDEBUG;%(PreprocessorDefinitions)".to_string()
            )]
        );
    }

    #[test]
    fn additional_options_are_space_separated() {
        let mut cl = ClCompile::default();
        cl.additional_options.insert("/Zm200");
        cl.additional_options.insert("/J");
        assert_eq!(
            cl.properties(),
            vec![("AdditionalOptions", "/Zm200 /J %(AdditionalOptions)".to_string())]
        );
    }

    #[test]
    fn properties_follow_table_order() {
        let cl = ClCompile {
            additional_options: ["/J"].into_iter().collect(),
            warning_level: Some("Level3".into()),
            excluded_from_build: Some(true),
            ..Default::default()
        };
        assert_eq!(
            names(&cl.properties()),
            vec!["ExcludedFromBuild", "WarningLevel", "AdditionalOptions"]
        );
    }

    // ── Default libraries ────────────────────────────────────────────────

    #[test]
    fn default_libraries_are_dropped() {
        let link = Link {
            additional_dependencies: ["kernel32.lib", "ws2_32.lib", "user32.lib"]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        assert_eq!(
            link.properties(),
            vec![(
                "AdditionalDependencies",
                "ws2_32.lib;%(AdditionalDependencies)".to_string()
            )]
        );
        // The decoded list itself is untouched.
        assert_eq!(link.additional_dependencies.len(), 3);
    }

    #[test]
    fn default_libraries_kept_when_ignoring_all() {
        let lib = Lib {
            additional_dependencies: ["kernel32.lib"].into_iter().collect(),
            ignore_all_default_libraries: Some(true),
            ..Default::default()
        };
        assert!(lib.visible_dependencies().contains("kernel32.lib"));
    }

    #[test]
    fn only_default_libraries_leaves_nothing_visible() {
        let link = Link {
            additional_dependencies: DEFAULT_LINK_LIBRARIES.into_iter().collect(),
            ..Default::default()
        };
        assert!(link.properties().is_empty());
    }

    // ── Configurations ───────────────────────────────────────────────────

    #[test]
    fn configuration_condition_and_key() {
        let pc = ProjectConfiguration::new("Release", "Win32");
        assert_eq!(
            pc.properties.condition,
            "'$(Configuration)|$(Platform)'=='Release|Win32'"
        );
        assert_eq!(pc.key(), "Win32 Release");
        assert_eq!(pc.include(), "Release|Win32");
    }

    #[test]
    fn configuration_level_tables() {
        let mut props = ConfigurationProperties::new("c");
        props.character_set = Some("Unicode".into());
        props.use_debug_libraries = Some(true);
        props.int_dir = Some("Debug".into());
        assert_eq!(names(&props.general()), vec!["UseDebugLibraries", "CharacterSet"]);
        assert_eq!(props.directories(), vec![("IntDir", "Debug".to_string())]);
        assert!(props.tool_blocks().iter().all(|(_, block)| block.is_empty()));
    }

    #[test]
    fn configuration_type_codes() {
        assert_eq!(ConfigurationType::from_code(0x0101), Some(ConfigurationType::Application));
        assert_eq!(ConfigurationType::from_code(0x0103), Some(ConfigurationType::Application));
        assert_eq!(ConfigurationType::from_code(0x0102), Some(ConfigurationType::DynamicLibrary));
        assert_eq!(ConfigurationType::from_code(0x0104), Some(ConfigurationType::StaticLibrary));
        assert_eq!(ConfigurationType::from_code(0x010a), None);
    }

    // ── Source files ─────────────────────────────────────────────────────

    #[test]
    fn file_kind_from_extension() {
        assert_eq!(FileKind::from_path(r".\main.CPP"), FileKind::ClCompile);
        assert_eq!(FileKind::from_path(r"..\src\util.c"), FileKind::ClCompile);
        assert_eq!(FileKind::from_path(r".\StdAfx.h"), FileKind::ClInclude);
        assert_eq!(FileKind::from_path(r".\app.rc"), FileKind::ResourceCompile);
        assert_eq!(FileKind::from_path(r".\res\app.ico"), FileKind::Image);
        assert_eq!(FileKind::from_path(r".\ReadMe.txt"), FileKind::Text);
        assert_eq!(FileKind::from_path(r".\app.def"), FileKind::None);
        assert_eq!(FileKind::from_path(r"..\dir.v2\Makefile"), FileKind::None);
    }

    #[test]
    fn variants_share_one_kind() {
        let file = SourceFile::new(r".\main.cpp", None, 3);
        assert_eq!(file.variants.len(), 3);
        assert!(file.variants.iter().all(|v| matches!(v, FileVariant::Compile(_))));
    }

    #[test]
    fn non_compile_variants_have_no_bags() {
        let mut file = SourceFile::new(r".\StdAfx.h", None, 1);
        assert!(file.variants[0].compiler_mut().is_none());
        assert!(file.variants[0].resource_mut().is_none());
        assert!(file.variants[0].properties().is_empty());
    }
}

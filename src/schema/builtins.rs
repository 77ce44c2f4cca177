//! Properties, metadata and tasks that exist without being declared.
//!
//! Names found here are never synthesized into a document's symbol table;
//! the table only records what the user's files introduce.

use crate::base::eq_ignore_case;

use super::value::ValueKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinSymbol {
    pub name: &'static str,
    pub description: &'static str,
    /// Reserved symbols cannot be assigned.
    pub reserved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinParameter {
    pub name: &'static str,
    pub kind: ValueKind,
    pub required: bool,
    pub output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinTask {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [BuiltinParameter],
}

impl BuiltinTask {
    pub fn parameter(&self, name: &str) -> Option<&'static BuiltinParameter> {
        self.parameters.iter().find(|p| eq_ignore_case(p.name, name))
    }
}

const fn reserved(name: &'static str, description: &'static str) -> BuiltinSymbol {
    BuiltinSymbol {
        name,
        description,
        reserved: true,
    }
}

const fn known(name: &'static str, description: &'static str) -> BuiltinSymbol {
    BuiltinSymbol {
        name,
        description,
        reserved: false,
    }
}

const fn input(name: &'static str, kind: ValueKind) -> BuiltinParameter {
    BuiltinParameter {
        name,
        kind,
        required: false,
        output: false,
    }
}

const fn required(name: &'static str, kind: ValueKind) -> BuiltinParameter {
    BuiltinParameter {
        name,
        kind,
        required: true,
        output: false,
    }
}

const fn output(name: &'static str, kind: ValueKind) -> BuiltinParameter {
    BuiltinParameter {
        name,
        kind,
        required: false,
        output: true,
    }
}

pub const PROPERTIES: &[BuiltinSymbol] = &[
    reserved("MSBuildProjectDirectory", "Directory of the project file"),
    reserved("MSBuildProjectDirectoryNoRoot", "Directory of the project file, without the drive"),
    reserved("MSBuildProjectExtension", "Extension of the project file, including the period"),
    reserved("MSBuildProjectFile", "File name of the project file, including the extension"),
    reserved("MSBuildProjectFullPath", "Absolute path of the project file"),
    reserved("MSBuildProjectName", "File name of the project file, without the extension"),
    reserved("MSBuildProjectDefaultTargets", "Targets in the project's DefaultTargets attribute"),
    reserved("MSBuildThisFile", "File name of the current file, including the extension"),
    reserved("MSBuildThisFileDirectory", "Directory of the current file, with a trailing slash"),
    reserved("MSBuildThisFileDirectoryNoRoot", "Directory of the current file, without the drive"),
    reserved("MSBuildThisFileExtension", "Extension of the current file"),
    reserved("MSBuildThisFileFullPath", "Absolute path of the current file"),
    reserved("MSBuildThisFileName", "File name of the current file, without the extension"),
    reserved("MSBuildBinPath", "Directory of the running MSBuild binaries"),
    reserved("MSBuildToolsPath", "Directory of the running MSBuild tools"),
    reserved("MSBuildToolsVersion", "Version of the running MSBuild tools"),
    reserved("MSBuildExtensionsPath", "Root of the MSBuild extensions directory"),
    reserved("MSBuildExtensionsPath32", "Root of the 32-bit MSBuild extensions directory"),
    reserved("MSBuildExtensionsPath64", "Root of the 64-bit MSBuild extensions directory"),
    reserved("MSBuildSDKsPath", "Directory containing the bundled SDKs"),
    reserved("MSBuildStartupDirectory", "Directory from which MSBuild was invoked"),
    reserved("MSBuildNodeCount", "Maximum number of concurrent build processes"),
    reserved("MSBuildLastTaskResult", "Result of the previous task"),
    reserved("MSBuildProgramFiles32", "32-bit program files directory"),
    reserved("MSBuildRuntimeType", "Runtime the build is executing on"),
    reserved("MSBuildVersion", "Version of MSBuild"),
    reserved("MSBuildAssemblyVersion", "Assembly version of MSBuild"),
    reserved("MSBuildInteractive", "Whether the build may prompt the user"),
    reserved("OS", "Operating system the build is running on"),
    known("Configuration", "Build configuration, for example Debug or Release"),
    known("Platform", "Target platform, for example AnyCPU"),
    known("TargetFramework", "Framework the project builds for"),
    known("TargetFrameworks", "Frameworks a multi-targeted project builds for"),
    known("TargetFrameworkIdentifier", "Identifier of the target framework"),
    known("TargetFrameworkVersion", "Version of the target framework"),
    known("OutputPath", "Directory that receives build output"),
    known("OutputType", "Kind of output, for example Exe or Library"),
    known("BaseIntermediateOutputPath", "Root of the intermediate output directories"),
    known("IntermediateOutputPath", "Directory that receives intermediate output"),
    known("MSBuildProjectExtensionsPath", "Directory of generated project extension imports"),
    known("AssemblyName", "Name of the output assembly"),
    known("RootNamespace", "Default namespace for new files"),
];

pub const METADATA: &[BuiltinSymbol] = &[
    reserved("FullPath", "Absolute path of the item"),
    reserved("RootDir", "Root directory of the item"),
    reserved("Filename", "File name of the item, without the extension"),
    reserved("Extension", "Extension of the item"),
    reserved("RelativeDir", "Directory of the item as written in the Include"),
    reserved("Directory", "Directory of the item, without the root"),
    reserved("RecursiveDir", "Part of the path matched by a recursive wildcard"),
    reserved("Identity", "The item as written in the Include"),
    reserved("ModifiedTime", "Last modification time of the item"),
    reserved("CreatedTime", "Creation time of the item"),
    reserved("AccessedTime", "Last access time of the item"),
    reserved("DefiningProjectFullPath", "Full path of the project that defined the item"),
    reserved("DefiningProjectDirectory", "Directory of the project that defined the item"),
    reserved("DefiningProjectName", "Name of the project that defined the item"),
    reserved("DefiningProjectExtension", "Extension of the project that defined the item"),
];

pub const TASKS: &[BuiltinTask] = &[
    BuiltinTask {
        name: "Message",
        description: "Logs a message",
        parameters: &[input("Text", ValueKind::String), input("Importance", ValueKind::Importance)],
    },
    BuiltinTask {
        name: "Error",
        description: "Stops the build with an error",
        parameters: &[
            input("Text", ValueKind::String),
            input("Code", ValueKind::String),
            input("File", ValueKind::File),
            input("HelpKeyword", ValueKind::String),
        ],
    },
    BuiltinTask {
        name: "Warning",
        description: "Logs a warning",
        parameters: &[
            input("Text", ValueKind::String),
            input("Code", ValueKind::String),
            input("File", ValueKind::File),
        ],
    },
    BuiltinTask {
        name: "Exec",
        description: "Runs a command",
        parameters: &[
            required("Command", ValueKind::String),
            input("WorkingDirectory", ValueKind::Folder),
            input("IgnoreExitCode", ValueKind::Bool),
            input("ConsoleToMSBuild", ValueKind::Bool),
            output("ExitCode", ValueKind::Int),
            output("ConsoleOutput", ValueKind::String),
        ],
    },
    BuiltinTask {
        name: "Copy",
        description: "Copies files",
        parameters: &[
            required("SourceFiles", ValueKind::File),
            input("DestinationFolder", ValueKind::Folder),
            input("DestinationFiles", ValueKind::File),
            input("SkipUnchangedFiles", ValueKind::Bool),
            output("CopiedFiles", ValueKind::File),
        ],
    },
    BuiltinTask {
        name: "Delete",
        description: "Deletes files",
        parameters: &[required("Files", ValueKind::File), output("DeletedFiles", ValueKind::File)],
    },
    BuiltinTask {
        name: "MakeDir",
        description: "Creates directories",
        parameters: &[required("Directories", ValueKind::Folder)],
    },
    BuiltinTask {
        name: "RemoveDir",
        description: "Removes directories",
        parameters: &[required("Directories", ValueKind::Folder)],
    },
    BuiltinTask {
        name: "Touch",
        description: "Updates file timestamps",
        parameters: &[required("Files", ValueKind::File), input("AlwaysCreate", ValueKind::Bool)],
    },
    BuiltinTask {
        name: "CallTarget",
        description: "Runs targets of the current project",
        parameters: &[input("Targets", ValueKind::TargetName), output("TargetOutputs", ValueKind::String)],
    },
    BuiltinTask {
        name: "MSBuild",
        description: "Builds other projects",
        parameters: &[
            required("Projects", ValueKind::ProjectFile),
            input("Targets", ValueKind::TargetName),
            input("Properties", ValueKind::String),
            output("TargetOutputs", ValueKind::String),
        ],
    },
    BuiltinTask {
        name: "WriteLinesToFile",
        description: "Writes lines to a file",
        parameters: &[
            required("File", ValueKind::File),
            input("Lines", ValueKind::String),
            input("Overwrite", ValueKind::Bool),
        ],
    },
    BuiltinTask {
        name: "ReadLinesFromFile",
        description: "Reads lines from a file",
        parameters: &[required("File", ValueKind::File), output("Lines", ValueKind::String)],
    },
];

pub fn builtin_property(name: &str) -> Option<&'static BuiltinSymbol> {
    PROPERTIES.iter().find(|p| eq_ignore_case(p.name, name))
}

pub fn builtin_metadata(name: &str) -> Option<&'static BuiltinSymbol> {
    METADATA.iter().find(|m| eq_ignore_case(m.name, name))
}

pub fn builtin_task(name: &str) -> Option<&'static BuiltinTask> {
    TASKS.iter().find(|t| eq_ignore_case(t.name, name))
}

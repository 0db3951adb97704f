//! End-to-end flow through the filesystem with the grammar-aware
//! classifier.

use availstrip_pipeline::{FileProcessor, OutcomeStatus, PipelineConfig, SkipReason};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

fn processor() -> FileProcessor<availstrip_classifier::DeclClassifier> {
    FileProcessor::with_default_classifier(PipelineConfig::default()).unwrap()
}

#[test]
fn rewrites_redundant_net_block_in_place() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("Widget.cs");
    fs::write(
        &path,
        concat!(
            "using System;\n",
            "#if NET\n",
            "[SupportedOSPlatform (\"ios13.0\")]\n",
            "#endif\n",
            "public partial class Widget { }\n",
        ),
    )
    .unwrap();

    let outcome = processor().process_file(&path).unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Rewritten);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "using System;\npublic partial class Widget { }\n"
    );
}

#[test]
fn inverts_block_and_keeps_legacy_branch() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("Widget.cs");
    fs::write(
        &path,
        concat!(
            "#if NET\n",
            "[SupportedOSPlatform (\"ios13.0\")]\n",
            "#else\n",
            "[Introduced (PlatformName.iOS, 13, 0)]\n",
            "#endif\n",
            "public partial class Widget { }\n",
        ),
    )
    .unwrap();

    let outcome = processor().process_file(&path).unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Rewritten);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        concat!(
            "#if !NET\n",
            "[Introduced (PlatformName.iOS, 13, 0)]\n",
            "#endif\n",
            "public partial class Widget { }\n",
        )
    );
}

#[test]
fn leaves_executable_block_untouched() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("Widget.cs");
    let original = concat!(
        "#if NET\n",
        "public void NewApi () { }\n",
        "#endif\n",
    );
    fs::write(&path, original).unwrap();

    let outcome = processor().process_file(&path).unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Unchanged);
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn skips_file_with_conflicting_guards() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("Widget.cs");
    let original = concat!(
        "#if IOS\n[iOS (11, 0)]\n#endif\n",
        "#if !IOS\n[NoiOS]\n#endif\n",
    );
    fs::write(&path, original).unwrap();

    let outcome = processor().process_file(&path).unwrap();

    assert_eq!(
        outcome.status,
        OutcomeStatus::Skipped(SkipReason::IneligibleConditions)
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn block_containing_region_directive_is_left_alone() {
    // deleting the block would orphan the #endregion below it
    let temp = tempdir().unwrap();
    let path = temp.path().join("Widget.cs");
    let original = concat!(
        "#if NET\n",
        "#region availability\n",
        "[SupportedOSPlatform (\"ios13.0\")]\n",
        "#endif\n",
        "#endregion\n",
        "class W { }\n",
    );
    fs::write(&path, original).unwrap();

    let outcome = processor().process_file(&path).unwrap();

    assert_eq!(outcome.status, OutcomeStatus::Unchanged);
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn preserves_crlf_line_endings() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("Widget.cs");
    fs::write(
        &path,
        "using System;\r\n#if NET\r\n[SupportedOSPlatform (\"ios13.0\")]\r\n#endif\r\nclass W { }\r\n",
    )
    .unwrap();

    processor().process_file(&path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "using System;\r\nclass W { }\r\n"
    );
}

#[test]
fn malformed_nesting_fails_without_touching_the_file() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("Widget.cs");
    let original = "#if NET\n[SupportedOSPlatform (\"ios13.0\")]\n";
    fs::write(&path, original).unwrap();

    assert!(processor().process_file(&path).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn stripping_is_idempotent_through_the_pipeline() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("Widget.cs");
    fs::write(
        &path,
        concat!(
            "#if NET\n",
            "[SupportedOSPlatform (\"ios13.0\")]\n",
            "#else\n",
            "[Introduced (PlatformName.iOS, 13, 0)]\n",
            "#endif\n",
        ),
    )
    .unwrap();

    processor().process_file(&path).unwrap();
    let after_first = fs::read_to_string(&path).unwrap();

    let second = processor().process_file(&path).unwrap();
    assert_eq!(second.status, OutcomeStatus::Unchanged);
    assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
}

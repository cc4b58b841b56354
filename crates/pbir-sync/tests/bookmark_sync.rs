//! Functional tests for bookmark synchronization.
//!
//! Core guarantees exercised here:
//! - Every source bookmark has exactly one derived copy per target page.
//! - Derived copies whose source is gone are deleted; nothing else is.
//! - Visual links on target pages point at the page's own derived copies.
//! - Rerunning with the same input changes nothing.

use pbir_sync::{
    duplicate_bookmarks, duplicate_visuals, NameFilter, SyncError, SyncOptions, SyncRequest,
    ValidationError,
};
use pbir_test_utils::ProjectFixture;
use pretty_assertions::assert_eq;
use serde_json::json;

const BK1: &str = "R/definition/bookmarks/bk1.bookmark.json";
const BK1_P2: &str = "R/definition/bookmarks/bk1_p2.bookmark.json";
const BK1_P3: &str = "R/definition/bookmarks/bk1_p3.bookmark.json";
const BK_OLD_P2: &str = "R/definition/bookmarks/bk_old_p2.bookmark.json";
const P2_NAV: &str = "R/definition/pages/p2/visuals/nav/visual.json";

/// Helper: one source bookmark and one stale derived copy.
///
/// The source page has `bk1`; page "p2" still carries `bk_old_p2`, derived
/// from a source bookmark that no longer exists.
fn stale_bookmark_project() -> ProjectFixture {
    ProjectFixture::new("R")
        .page("main")
        .page("p2")
        .bookmark("bk1", "main")
        .bookmark("bk_old_p2", "p2")
}

/// Tenet: stale derived bookmarks are removed and missing ones created.
///
/// `bk_old_p2` is deleted and `bk1_p2` appears with its active section on
/// "p2". The source bookmark is untouched.
#[test]
fn replaces_stale_bookmark() {
    let project = stale_bookmark_project().build_dir();
    let source_before = project.read_json(BK1).unwrap();

    let summary =
        duplicate_bookmarks(project.path(), &SyncRequest::new("R"), &SyncOptions::new()).unwrap();

    assert_eq!(summary.deleted, vec!["bk_old_p2"]);
    assert_eq!(summary.upserted, vec!["bk1_p2"]);
    assert!(!project.exists(BK_OLD_P2));

    let derived = project.read_json(BK1_P2).unwrap();
    assert_eq!(derived["name"], "bk1_p2");
    assert_eq!(derived["displayName"], "p2_Bookmark bk1");
    assert_eq!(derived["explorationState"]["activeSection"], "p2");
    assert_eq!(
        derived["explorationState"]["sections"],
        json!({"p2": {"visualContainers": {}}})
    );

    assert_eq!(project.read_json(BK1).unwrap(), source_before);
}

/// Tenet: one derived copy per source bookmark and target page.
#[test]
fn every_target_gets_its_own_copy() {
    let project = stale_bookmark_project().page("p3").build_dir();

    let summary =
        duplicate_bookmarks(project.path(), &SyncRequest::new("R"), &SyncOptions::new()).unwrap();

    assert_eq!(summary.pages, vec!["p2", "p3"]);
    assert!(project.exists(BK1_P2));
    assert!(project.exists(BK1_P3));
    assert_eq!(
        project.read_json(BK1_P3).unwrap()["explorationState"]["activeSection"],
        "p3"
    );
}

/// Tenet: orphan cleanup only touches bookmarks derived for a target page.
///
/// Bookmarks without a target-page suffix, and those for pages outside the
/// run, survive.
#[test]
fn cleanup_is_scoped_to_target_suffixes() {
    let project = stale_bookmark_project()
        .page("p3")
        .bookmark("standalone", "p2")
        .bookmark("bk_old_p3", "p3")
        .build_dir();

    let request = SyncRequest::new("R").with_targets(["p2"]);
    let summary = duplicate_bookmarks(project.path(), &request, &SyncOptions::new()).unwrap();

    assert_eq!(summary.deleted, vec!["bk_old_p2"]);
    assert!(project.exists("R/definition/bookmarks/standalone.bookmark.json"));
    assert!(project.exists("R/definition/bookmarks/bk_old_p3.bookmark.json"));
}

/// Tenet: a source bookmark whose id happens to end in a page suffix is kept.
#[test]
fn source_bookmark_with_page_suffix_survives() {
    let project = ProjectFixture::new("R")
        .page("main")
        .page("p2")
        .bookmark("intro_p2", "main")
        .build_dir();

    let summary =
        duplicate_bookmarks(project.path(), &SyncRequest::new("R"), &SyncOptions::new()).unwrap();

    assert!(summary.deleted.is_empty());
    assert!(project.exists("R/definition/bookmarks/intro_p2.bookmark.json"));
    assert!(project.exists("R/definition/bookmarks/intro_p2_p2.bookmark.json"));
}

/// Tenet: target visual links point at the page's derived bookmark.
///
/// Links are matched by index: the second link of `nav` names `bk1` on the
/// source page, so the second link on "p2" becomes `bk1_p2`. The first link
/// carries no bookmark and stays as it is.
#[test]
fn visual_links_are_repointed() {
    let project = ProjectFixture::new("R")
        .page("main")
        .visual("main", "nav", |v| v.plain_link().link("bk1"))
        .page("p2")
        .bookmark("bk1", "main")
        .build_dir();
    let request = SyncRequest::new("R");
    duplicate_visuals(project.path(), &request, &SyncOptions::new()).unwrap();

    let summary = duplicate_bookmarks(project.path(), &request, &SyncOptions::new()).unwrap();

    assert_eq!(summary.links_rewritten, 1);
    let nav = project.read_json(P2_NAV).unwrap();
    let links = &nav["visual"]["visualContainerObjects"]["visualLink"];
    assert_eq!(
        links[1]["properties"]["bookmark"]["expr"]["Literal"]["Value"],
        "'bk1_p2'"
    );
    assert!(links[0]["properties"].get("bookmark").is_none());
}

/// Tenet: the bookmark filter limits which sources are mirrored.
#[test]
fn filter_selects_source_bookmarks() {
    let project = stale_bookmark_project().bookmark("bk2", "main").build_dir();

    let request = SyncRequest::new("R").with_filter(NameFilter::One("bk2".into()));
    let summary = duplicate_bookmarks(project.path(), &request, &SyncOptions::new()).unwrap();

    assert_eq!(summary.source_bookmarks, vec!["bk2"]);
    assert!(project.exists("R/definition/bookmarks/bk2_p2.bookmark.json"));
    assert!(!project.exists(BK1_P2));
}

/// Tenet: a filter that matches nothing still cleans up orphans.
#[test]
fn unmatched_filter_runs_cleanup_only() {
    let project = stale_bookmark_project().build_dir();

    let request = SyncRequest::new("R").with_filter(NameFilter::One("missing".into()));
    let summary = duplicate_bookmarks(project.path(), &request, &SyncOptions::new()).unwrap();

    assert!(summary.upserted.is_empty());
    assert_eq!(summary.deleted, vec!["bk_old_p2"]);
}

/// Tenet: a second run with the same input leaves every file as it was.
#[test]
fn rerun_is_stable() {
    let project = stale_bookmark_project().build_dir();
    let request = SyncRequest::new("R");
    duplicate_bookmarks(project.path(), &request, &SyncOptions::new()).unwrap();
    let after_first = project.snapshot();

    let summary = duplicate_bookmarks(project.path(), &request, &SyncOptions::new()).unwrap();

    assert!(summary.deleted.is_empty());
    assert_eq!(project.snapshot(), after_first);
}

/// Tenet: unknown target pages fail validation before anything changes.
#[test]
fn unknown_target_writes_nothing() {
    let project = stale_bookmark_project().build_dir();
    let before = project.snapshot();

    let request = SyncRequest::new("R").with_targets(["p2", "nowhere"]);
    let err = duplicate_bookmarks(project.path(), &request, &SyncOptions::new()).unwrap_err();

    assert!(matches!(
        err,
        SyncError::InputValidation(ValidationError::UnknownTargetPage(_))
    ));
    assert_eq!(project.snapshot(), before);
}

/// Tenet: dry runs report the plan and write nothing.
#[test]
fn dry_run_reports_without_writing() {
    let project = stale_bookmark_project().build_dir();
    let before = project.snapshot();

    let options = SyncOptions::new().with_dry_run(true);
    let summary = duplicate_bookmarks(project.path(), &SyncRequest::new("R"), &options).unwrap();

    assert_eq!(summary.deleted, vec!["bk_old_p2"]);
    assert_eq!(summary.upserted, vec!["bk1_p2"]);
    assert_eq!(project.snapshot(), before);
}

/// Tenet: orphans are found by file name, whatever their content.
///
/// A stale derived bookmark that no longer decodes is still deleted.
#[test]
fn unreadable_orphan_is_deleted() {
    let project = ProjectFixture::new("R")
        .page("main")
        .page("p2")
        .bookmark("bk1", "main")
        .raw(BK_OLD_P2, b"{ truncated")
        .build_dir();

    let summary =
        duplicate_bookmarks(project.path(), &SyncRequest::new("R"), &SyncOptions::new()).unwrap();

    assert_eq!(summary.deleted, vec!["bk_old_p2"]);
    assert!(!project.exists(BK_OLD_P2));
    assert!(project.exists(BK1_P2));
}

/// Tenet: a link whose visual is missing on the target is skipped quietly.
///
/// `nav` exists only on the source page, so "p2" has nothing to repoint and
/// no visual document is created for it.
#[test]
fn missing_target_visual_is_skipped() {
    let project = ProjectFixture::new("R")
        .page("main")
        .visual("main", "nav", |v| v.link("bk1"))
        .page("p2")
        .bookmark("bk1", "main")
        .build_dir();

    let summary =
        duplicate_bookmarks(project.path(), &SyncRequest::new("R"), &SyncOptions::new()).unwrap();

    assert_eq!(summary.upserted, vec!["bk1_p2"]);
    assert_eq!(summary.links_rewritten, 0);
    assert!(!project.exists(P2_NAV));
}

/// Tenet: links are only repointed at bookmarks that were written.
///
/// A source bookmark named `bad/id` cannot produce a derived file, so the
/// matching link on "p2" keeps pointing at the source bookmark.
#[test]
fn unwritable_derived_id_leaves_link_alone() {
    let project = ProjectFixture::new("R")
        .page("main")
        .visual("main", "nav", |v| v.link("bad/id"))
        .page("p2")
        .raw_bookmark(
            "bk1",
            json!({
                "name": "bad/id",
                "explorationState": {"activeSection": "main", "sections": {"main": {}}}
            }),
        )
        .build_dir();
    let request = SyncRequest::new("R");
    duplicate_visuals(project.path(), &request, &SyncOptions::new()).unwrap();

    let summary = duplicate_bookmarks(project.path(), &request, &SyncOptions::new()).unwrap();

    assert!(summary.upserted.is_empty());
    assert_eq!(summary.links_rewritten, 0);
    let nav = project.read_json(P2_NAV).unwrap();
    assert_eq!(
        nav["visual"]["visualContainerObjects"]["visualLink"][0]["properties"]["bookmark"]["expr"]
            ["Literal"]["Value"],
        "'bad/id'"
    );
}

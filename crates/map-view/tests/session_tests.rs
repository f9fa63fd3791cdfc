//! Tests for the session wiring: legend lifetime, event loop and teardown.

mod common;

use std::rc::Rc;
use std::time::Duration;

use common::*;
use forecast_common::LatLng;
use map_view::{
    EventOutcome, HeadlessSurface, MapEvent, MapSession, OverlayOutcome, PopupContent,
    QueryOutcome, SessionConfig, SurfaceEvent,
};
use renderer::Legend;
use test_utils::fixtures::{bounds, stats};
use tokio::sync::mpsc;

fn click_point() -> LatLng {
    LatLng::new(bounds::CLICK.0, bounds::CLICK.1)
}

fn session(rasters: Rc<ScriptedRasters>, lookups: Rc<ScriptedStats>) -> (Rc<HeadlessSurface>, MapSession) {
    let (surface, dyn_surface) = headless();
    let session = MapSession::new(dyn_surface, rasters, lookups, SessionConfig::default());
    (surface, session)
}

/// Wait (on the runtime clock) until `cond` holds.
async fn until(cond: impl Fn() -> bool) {
    for _ in 0..2000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not reached");
}

// ============================================================================
// Legend
// ============================================================================

#[tokio::test]
async fn test_legend_added_on_create() {
    let (surface, session) = session(ScriptedRasters::new(), ScriptedStats::new());

    assert_eq!(surface.legend(), Some(session.legend().clone()));
    assert_eq!(session.legend(), &Legend::default());
    assert!(surface.click_handler_bound());
}

#[tokio::test]
async fn test_teardown_removes_everything() {
    let rasters = ScriptedRasters::new();
    rasters.ready(CONUS_URL, conus_tiff());
    let (surface, session) = session(rasters, ScriptedStats::new());

    session.select(conus_source()).await;
    assert_eq!(surface.layer_count(), 1);

    session.teardown();
    session.teardown();

    assert!(session.is_disposed());
    assert_eq!(surface.layer_count(), 0);
    assert!(surface.legend().is_none());
    assert!(!surface.click_handler_bound());
    let removed = surface
        .events()
        .into_iter()
        .filter(|e| *e == SurfaceEvent::LegendRemoved)
        .count();
    assert_eq!(removed, 1);

    assert_eq!(session.select(conus_source()).await, OverlayOutcome::Superseded);
    assert_eq!(session.click(click_point()).await, QueryOutcome::Ignored);
    assert_eq!(surface.layer_count(), 0);
}

#[tokio::test]
async fn test_drop_tears_down() {
    let (surface, session) = session(ScriptedRasters::new(), ScriptedStats::new());
    assert!(surface.legend().is_some());

    drop(session);

    assert!(surface.legend().is_none());
    assert!(!surface.click_handler_bound());
}

// ============================================================================
// Overlay replacement
// ============================================================================

#[tokio::test]
async fn test_new_overlay_closes_popup() {
    let rasters = ScriptedRasters::new();
    rasters.ready(CONUS_URL, conus_tiff());
    rasters.ready(KANSAS_URL, kansas_tiff());
    let lookups = ScriptedStats::new();
    lookups.push_json(stats::SINGLE_MODEL);
    let (surface, session) = session(rasters, lookups);

    session.select(conus_source()).await;
    assert_eq!(session.click(click_point()).await, QueryOutcome::Rendered);
    assert!(surface.popup().is_some());

    session.select(kansas_source()).await;

    assert!(surface.popup().is_none());
    assert!(session.popup().is_none());
    assert!(session.query().pending().is_none());
}

#[tokio::test]
async fn test_failed_overlay_keeps_popup() {
    let rasters = ScriptedRasters::new();
    rasters.ready(CONUS_URL, conus_tiff());
    let lookups = ScriptedStats::new();
    lookups.push_json(stats::SINGLE_MODEL);
    let (surface, session) = session(rasters, lookups);

    session.select(conus_source()).await;
    session.click(click_point()).await;

    let outcome = session.select(kansas_source()).await;

    assert!(matches!(outcome, OverlayOutcome::Failed(_)));
    assert!(surface.popup().is_some());
    assert_eq!(surface.layer_count(), 1);
}

// ============================================================================
// Event loop
// ============================================================================

#[tokio::test]
async fn test_run_serves_select_then_click() {
    let rasters = ScriptedRasters::new();
    rasters.ready(CONUS_URL, conus_tiff());
    let lookups = ScriptedStats::new();
    lookups.push_json(stats::SINGLE_MODEL);
    let (surface, session) = session(rasters, lookups.clone());
    let (tx, rx) = mpsc::channel(8);

    let (outcomes, ()) = tokio::join!(session.run(rx), async {
        tx.send(MapEvent::Select(conus_source())).await.unwrap();
        until(|| surface.layer_count() == 1).await;

        tx.send(MapEvent::Click(click_point())).await.unwrap();
        until(|| matches!(surface.popup().map(|p| p.content), Some(PopupContent::Stats(_)))).await;

        tx.send(MapEvent::Teardown).await.unwrap();
    });

    assert_eq!(outcomes.len(), 2);
    assert!(matches!(outcomes[0], EventOutcome::Overlay(OverlayOutcome::Attached { .. })));
    assert_eq!(outcomes[1], EventOutcome::Query(QueryOutcome::Rendered));
    assert_eq!(lookups.requests(), vec![click_point()]);
    assert!(session.is_disposed());
    assert_eq!(surface.layer_count(), 0);
}

#[tokio::test]
async fn test_run_serves_click_while_overlay_loads() {
    let rasters = ScriptedRasters::new();
    let slow = rasters.held(CONUS_URL, conus_tiff());
    let lookups = ScriptedStats::new();
    let (surface, session) = session(rasters.clone(), lookups.clone());
    let (tx, rx) = mpsc::channel(8);

    let (outcomes, ()) = tokio::join!(session.run(rx), async {
        tx.send(MapEvent::Select(conus_source())).await.unwrap();
        until(|| rasters.calls() == 1).await;

        tx.send(MapEvent::Click(click_point())).await.unwrap();
        until(|| surface.popup().map(|p| p.content) == Some(PopupContent::NoDataAvailable)).await;

        slow.release();
        until(|| surface.layer_count() == 1).await;
        drop(tx);
    });

    assert_eq!(
        outcomes[0],
        EventOutcome::Query(QueryOutcome::NoDataAvailable)
    );
    assert!(matches!(outcomes[1], EventOutcome::Overlay(OverlayOutcome::Attached { .. })));
    assert!(lookups.requests().is_empty());
    // the attach closed the stale popup
    assert!(surface.events().contains(&SurfaceEvent::PopupClosed));
    // a dropped sender ends the session like a teardown
    assert!(session.is_disposed());
}

#[tokio::test]
async fn test_run_teardown_supersedes_pending_load() {
    let rasters = ScriptedRasters::new();
    let slow = rasters.held(CONUS_URL, conus_tiff());
    let (surface, session) = session(rasters.clone(), ScriptedStats::new());
    let (tx, rx) = mpsc::channel(8);

    let (outcomes, ()) = tokio::join!(session.run(rx), async {
        tx.send(MapEvent::Select(conus_source())).await.unwrap();
        until(|| rasters.calls() == 1).await;
        tx.send(MapEvent::Teardown).await.unwrap();
        until(|| surface.legend().is_none()).await;
        slow.release();
    });

    assert_eq!(outcomes, vec![EventOutcome::Overlay(OverlayOutcome::Superseded)]);
    assert_eq!(surface.max_layers_seen(), 0);
}

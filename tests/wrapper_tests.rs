//! Xform Wrapper Tests
//!
//! Tests for:
//! - Write binding: define vs override, `created` flag, ancestor repair
//! - Definition failure degrading to an invalid wrapper
//! - Rebinding (`redefine`) idempotence
//! - Refinement with purpose filtering
//! - Transform authoring through the write scope and the xform cache
//! - Wrapper family type ids and soft copies

use glam::{DMat4, DVec3};

use stagebridge::errors::BridgeError;
use stagebridge::{
    token, BridgeContext, PrimPath, PrimWrapper, PurposeSet, RefineParms, Refiner, Stage,
    StagePtr, TimeCode, Xform, XformCache, XformWrapper,
};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn path(text: &str) -> PrimPath {
    PrimPath::new(text).unwrap()
}

fn translation(x: f64) -> DMat4 {
    DMat4::from_translation(DVec3::new(x, 0.0, 0.0))
}

struct CollectingRefiner {
    prims: Vec<Box<dyn PrimWrapper>>,
}

impl CollectingRefiner {
    fn new() -> Self {
        CollectingRefiner { prims: Vec::new() }
    }
}

impl Refiner for CollectingRefiner {
    fn add_primitive(&mut self, prim: Box<dyn PrimWrapper>) {
        self.prims.push(prim);
    }
}

// ============================================================================
// Write Binding
// ============================================================================

#[test]
fn define_for_write_creates_new_prim() {
    let stage = Stage::in_memory();
    let wrapper = XformWrapper::define_for_write(&stage, &path("/geo"), &BridgeContext::default());

    assert!(wrapper.is_valid());
    assert!(wrapper.created());
    let key = stage.prim_at_path(&path("/geo")).unwrap();
    assert_eq!(stage.type_name_of(key), Some(Xform::type_token()));
}

#[test]
fn define_for_write_deep_path_types_every_ancestor() {
    let stage = Stage::in_memory();
    let wrapper =
        XformWrapper::define_for_write(&stage, &path("/a/b/c"), &BridgeContext::default());

    assert!(wrapper.is_valid());
    assert!(wrapper.created());
    for ancestor in ["/a", "/a/b"] {
        let key = stage.prim_at_path(&path(ancestor)).unwrap();
        assert_eq!(stage.type_name_of(key), Some(Xform::type_token()));
    }
}

#[test]
fn overlay_of_existing_prim_preserves_identity() {
    let stage = Stage::in_memory();
    let existing = stage
        .define_prim(&path("/geo"), token::intern("Camera"))
        .unwrap();

    let ctxt = BridgeContext::default().overlay(true);
    let wrapper = XformWrapper::define_for_write(&stage, &path("/geo"), &ctxt);

    assert!(wrapper.is_valid());
    assert!(!wrapper.created(), "overlay of an existing prim");
    assert_eq!(stage.prim_at_path(&path("/geo")), Some(existing));
    // The prim keeps its own type; only the transform capability widened.
    assert_eq!(stage.type_name_of(existing), Some(token::intern("Camera")));
}

#[test]
fn overlay_of_missing_prim_defines_and_repairs_ancestors() {
    let stage = Stage::in_memory();
    // Pre-existing typeless overs above the target path.
    stage.override_prim(&path("/a/b")).unwrap();

    let ctxt = BridgeContext::default().overlay(true);
    let wrapper = XformWrapper::define_for_write(&stage, &path("/a/b/c"), &ctxt);

    assert!(wrapper.is_valid());
    assert!(wrapper.created(), "missing prim is defined even in overlay mode");
    for ancestor in ["/a", "/a/b"] {
        let key = stage.prim_at_path(&path(ancestor)).unwrap();
        assert_eq!(
            stage.type_name_of(key),
            Some(Xform::type_token()),
            "typeless ancestor {ancestor} must be repaired"
        );
    }
}

#[test]
fn failed_definition_yields_invalid_wrapper() {
    init_logs();
    let stage = Stage::in_memory().open_read_only();
    let wrapper = XformWrapper::define_for_write(&stage, &path("/geo"), &BridgeContext::default());

    assert!(!wrapper.is_valid());
    assert!(wrapper.path().is_none());
    // No lock may be acquired through the failed binding.
    assert!(matches!(
        wrapper.write_holder(),
        Err(BridgeError::InvalidHandle { .. })
    ));
    assert!(matches!(
        wrapper.read_holder(),
        Err(BridgeError::InvalidHandle { .. })
    ));
}

// ============================================================================
// Rebinding
// ============================================================================

#[test]
fn redefine_is_idempotent() {
    let stage = Stage::in_memory();
    let ctxt = BridgeContext::default();
    let mut wrapper = XformWrapper::define_for_write(&stage, &path("/a"), &ctxt);

    let first = wrapper.redefine(&stage, &path("/x/y"), &ctxt);
    let path_after_first = wrapper.path().cloned();
    let second = wrapper.redefine(&stage, &path("/x/y"), &ctxt);

    assert_eq!(first, second);
    assert_eq!(wrapper.path().cloned(), path_after_first);
    assert!(wrapper.is_valid());
}

#[test]
fn redefine_to_read_only_stage_invalidates() {
    init_logs();
    let stage = Stage::in_memory();
    let ctxt = BridgeContext::default();
    let mut wrapper = XformWrapper::define_for_write(&stage, &path("/a"), &ctxt);
    assert!(wrapper.is_valid());

    let frozen = stage.open_read_only();
    assert!(!wrapper.redefine(&frozen, &path("/b"), &ctxt));
    assert!(!wrapper.is_valid());
}

// ============================================================================
// Refinement
// ============================================================================

fn read_stage_with_children() -> StagePtr {
    let stage = Stage::in_memory();
    stage.define_prim(&path("/root/a"), Xform::type_token()).unwrap();
    stage.define_prim(&path("/root/b"), Xform::type_token()).unwrap();
    stage
        .define_prim(&path("/root/cam"), token::intern("Camera"))
        .unwrap();
    stage
}

#[test]
fn refine_emits_one_wrapper_per_known_child() {
    init_logs();
    let stage = read_stage_with_children();
    let wrapper = XformWrapper::define_for_read(
        &stage,
        &path("/root"),
        TimeCode::DEFAULT,
        PurposeSet::default(),
    );

    let mut refiner = CollectingRefiner::new();
    assert!(wrapper.refine(&mut refiner, &RefineParms::default()));

    // Two Xform children; the Camera child has no registered wrapper family.
    assert_eq!(refiner.prims.len(), 2);
    let mut paths: Vec<String> = refiner
        .prims
        .iter()
        .map(|p| p.path().unwrap().to_string())
        .collect();
    paths.sort();
    assert_eq!(paths, ["/root/a", "/root/b"]);
    assert!(refiner.prims.iter().all(|p| p.is_valid()));
}

#[test]
fn refine_filters_by_purpose() {
    let stage = read_stage_with_children();
    {
        use stagebridge::{Imageable, PrimHolder};
        let guide = PrimHolder::<Imageable>::bind(&stage, &path("/root/b")).unwrap();
        guide.acquire_write().prim_mut().set_purpose(PurposeSet::GUIDE);
    }

    let wrapper = XformWrapper::define_for_read(
        &stage,
        &path("/root"),
        TimeCode::DEFAULT,
        PurposeSet::default(),
    );

    let mut refiner = CollectingRefiner::new();
    wrapper.refine(&mut refiner, &RefineParms::default());
    assert_eq!(refiner.prims.len(), 1);
    assert_eq!(refiner.prims[0].path().unwrap(), &path("/root/a"));

    let mut all = CollectingRefiner::new();
    let parms = RefineParms {
        include_all_purposes: true,
    };
    wrapper.refine(&mut all, &parms);
    assert_eq!(all.prims.len(), 2);
}

#[test]
fn refine_on_unbound_wrapper_produces_nothing() {
    init_logs();
    let stage = Stage::in_memory();
    let wrapper = XformWrapper::define_for_read(
        &stage,
        &path("/missing"),
        TimeCode::DEFAULT,
        PurposeSet::default(),
    );

    assert!(!wrapper.is_valid());
    let mut refiner = CollectingRefiner::new();
    assert!(!wrapper.refine(&mut refiner, &RefineParms::default()));
    assert!(refiner.prims.is_empty());
}

// ============================================================================
// Transform Authoring
// ============================================================================

#[test]
fn update_from_source_authors_sample_at_context_time() {
    let stage = Stage::in_memory();
    let ctxt = BridgeContext::at_time(TimeCode::from_frame(12.0));
    let wrapper = XformWrapper::define_for_write(&stage, &path("/geo"), &ctxt);

    let mut cache = XformCache::default();
    assert!(wrapper.update_from_source(translation(3.0), &ctxt, &mut cache));

    let read = XformWrapper::define_for_read(
        &stage,
        &path("/geo"),
        ctxt.time,
        PurposeSet::default(),
    );
    let authored = read
        .with_imageable(|view| view.prim().transform(TimeCode::from_frame(12.0)))
        .unwrap();
    assert_eq!(authored, translation(3.0));
}

#[test]
fn xform_cache_composes_world_transforms() {
    let stage = Stage::in_memory();
    let ctxt = BridgeContext::at_time(TimeCode::from_frame(1.0));
    let parent = XformWrapper::define_for_write(&stage, &path("/root"), &ctxt);
    let child = XformWrapper::define_for_write(&stage, &path("/root/child"), &ctxt);

    let mut cache = XformCache::default();
    parent.update_from_source(translation(1.0), &ctxt, &mut cache);
    child.update_from_source(translation(2.0), &ctxt, &mut cache);

    assert_eq!(cache[&path("/root")], translation(1.0));
    assert_eq!(cache[&path("/root/child")], translation(1.0) * translation(2.0));
}

#[test]
fn update_without_write_binding_returns_false() {
    let stage = Stage::in_memory();
    stage.define_prim(&path("/geo"), Xform::type_token()).unwrap();
    let read_only_wrapper = XformWrapper::define_for_read(
        &stage,
        &path("/geo"),
        TimeCode::DEFAULT,
        PurposeSet::default(),
    );

    let mut cache = XformCache::default();
    assert!(!read_only_wrapper.update_from_source(
        translation(1.0),
        &BridgeContext::default(),
        &mut cache
    ));
    assert!(cache.is_empty());
}

// ============================================================================
// Family Ids & Copies
// ============================================================================

#[test]
fn unique_type_id_is_stable_per_family() {
    let stage = Stage::in_memory();
    let a = XformWrapper::define_for_write(&stage, &path("/a"), &BridgeContext::default());
    let b = XformWrapper::define_for_write(&stage, &path("/b"), &BridgeContext::default());
    assert_eq!(a.unique_type_id(), b.unique_type_id());
    assert_eq!(a.class_name(), "XformWrapper");
}

#[test]
fn soft_copy_shares_binding() {
    let stage = Stage::in_memory();
    let wrapper = XformWrapper::define_for_write(&stage, &path("/geo"), &BridgeContext::default());
    let copy = wrapper.soft_copy();

    assert!(copy.is_valid());
    assert_eq!(copy.path(), wrapper.path());
    assert_eq!(copy.unique_type_id(), wrapper.unique_type_id());

    // Authoring through the copy is visible through the original's stage.
    let ctxt = BridgeContext::at_time(TimeCode::from_frame(1.0));
    let mut cache = XformCache::default();
    assert!(copy.update_from_source(translation(5.0), &ctxt, &mut cache));

    let read = XformWrapper::define_for_read(
        &stage,
        &path("/geo"),
        ctxt.time,
        PurposeSet::default(),
    );
    let authored = read
        .with_imageable(|view| view.prim().transform(TimeCode::from_frame(1.0)))
        .unwrap();
    assert_eq!(authored, translation(5.0));
}

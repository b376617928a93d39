//! The three backends draw the same geometry for the same layout.

use glam::{Mat4, Vec4Swizzles};

use layview_core::{BBox, Layout, Point, Primitive, Shape, ShapeProperties, ShapeType};
use layview_renderer::scene::WORLD_FACTOR;
use layview_renderer::{
    create_renderer, MeshKind, RenderFrame, Renderer, RendererConfig, RendererKind,
};

const TOLERANCE: f64 = 1e-3;

fn shape(name: &str, shape_type: ShapeType, x: f64, y: f64, width: f64, height: f64) -> Shape {
    Shape::new(name, shape_type, ShapeProperties { x, y, width, height })
}

fn sample_layout() -> Layout {
    Layout::new(vec![
        shape("hw", ShapeType::Highway, 0.0, 0.0, 3000.0, 600.0),
        shape("in", ShapeType::Intake, 0.0, 1000.0, 400.0, 2500.0),
        shape("tiny", ShapeType::Delivery, 4000.0, 0.0, 400.0, 100.0),
        shape("thin", ShapeType::Delivery, 4000.0, 500.0, 1000.0, 200.0),
    ])
    .unwrap()
}

fn rendered(kind: RendererKind, layout: &Layout) -> Box<dyn Renderer> {
    let mut renderer = create_renderer(kind, &RendererConfig::default()).unwrap();
    renderer.render_layout(layout).unwrap();
    renderer
}

/// Scene instances mapped back to 2D render space, ground plane skipped.
fn scene_primitives(frame: &RenderFrame) -> Vec<Primitive> {
    frame.instances[1..]
        .iter()
        .map(|instance| {
            let m = Mat4::from_cols_array(&instance.transform);
            let sx = m.x_axis.xyz().length() as f64 / WORLD_FACTOR;
            let sz = m.z_axis.xyz().length() as f64 / WORLD_FACTOR;
            let cx = m.w_axis.x as f64 / WORLD_FACTOR;
            let cz = m.w_axis.z as f64 / WORLD_FACTOR;
            match instance.mesh {
                MeshKind::Box => Primitive::Rect(layview_core::Rect::new(
                    cx - sx / 2.0,
                    cz - sz / 2.0,
                    sx,
                    sz,
                )),
                MeshKind::Cylinder => Primitive::Circle {
                    center: Point::new(cx, cz),
                    radius: sx,
                },
            }
        })
        .collect()
}

fn assert_same_geometry(a: &Primitive, b: &Primitive) {
    let (ba, bb) = (a.bbox().unwrap(), b.bbox().unwrap());
    let close = |x: f64, y: f64| (x - y).abs() < TOLERANCE;
    assert!(
        close(ba.min.x, bb.min.x)
            && close(ba.min.y, bb.min.y)
            && close(ba.max.x, bb.max.x)
            && close(ba.max.y, bb.max.y),
        "{:?} != {:?}",
        a,
        b
    );
    assert_eq!(
        std::mem::discriminant(a),
        std::mem::discriminant(b),
        "{:?} vs {:?}",
        a,
        b
    );
}

#[test]
fn test_backends_draw_identical_geometry() {
    let layout = sample_layout();
    let planar = rendered(RendererKind::Planar, &layout).frame();
    let sprite = rendered(RendererKind::Sprite, &layout).frame();
    let scene = rendered(RendererKind::Scene, &layout).frame();

    // hw: 3 cells, in: 2 cells, tiny: outline only, thin: 1 cell.
    let expected = (1 + 9) + (1 + 6) + 1 + (1 + 3);
    assert_eq!(planar.object_count, expected);
    assert_eq!(sprite.object_count, expected);
    assert_eq!(scene.object_count, expected);

    let scene = scene_primitives(&scene);
    assert_eq!(scene.len(), expected);
    for ((p, s), w) in planar.items.iter().zip(&sprite.items).zip(&scene) {
        assert_eq!(p.name, s.name);
        assert_eq!(p.primitive, s.primitive);
        assert_eq!(p.paint, s.paint);
        assert_same_geometry(&p.primitive, w);
    }
}

#[test]
fn test_thin_shape_cell_clamped() {
    let layout = Layout::new(vec![shape("t", ShapeType::Highway, 0.0, 0.0, 1000.0, 200.0)]).unwrap();
    for kind in RendererKind::ALL {
        let frame = rendered(kind, &layout).frame();
        assert_eq!(frame.object_count, 4, "{}", kind);
        if kind == RendererKind::Scene {
            let prims = scene_primitives(&frame);
            match &prims[1] {
                Primitive::Rect(r) => {
                    assert!((r.x - 20.0).abs() < TOLERANCE);
                    assert!((r.width - 60.0).abs() < TOLERANCE);
                    assert!(r.height.abs() < TOLERANCE);
                }
                other => panic!("expected a rect, got {:?}", other),
            }
        } else {
            assert_eq!(
                frame.items[1].primitive,
                Primitive::Rect(layview_core::Rect::new(20.0, 20.0, 60.0, 0.0))
            );
        }
    }
}

#[test]
fn test_fit_contains_everything_and_touches_an_edge() {
    let layout = sample_layout();
    for kind in RendererKind::ALL {
        let renderer = rendered(kind, &layout);
        let frame = renderer.frame();
        let mut bounds: Vec<BBox> = match kind {
            RendererKind::Scene => scene_primitives(&frame)
                .iter()
                .filter_map(Primitive::bbox)
                .map(|b| {
                    BBox::new(
                        Point::new(b.min.x * WORLD_FACTOR, b.min.y * WORLD_FACTOR),
                        Point::new(b.max.x * WORLD_FACTOR, b.max.y * WORLD_FACTOR),
                    )
                })
                .collect(),
            _ => frame.items.iter().filter_map(|i| i.primitive.bbox()).collect(),
        };
        let all = BBox::union_all(bounds.drain(..)).unwrap();
        let vp = renderer.viewport();
        let min = vp.world_to_screen(all.min);
        let max = vp.world_to_screen(all.max);
        let eps = 1e-2;
        assert!(min.x >= -eps && min.y >= -eps, "{}: {:?}", kind, min);
        assert!(max.x <= vp.canvas_width + eps && max.y <= vp.canvas_height + eps, "{}: {:?}", kind, max);
        let touches = min.x.abs() < eps
            || min.y.abs() < eps
            || (max.x - vp.canvas_width).abs() < eps
            || (max.y - vp.canvas_height).abs() < eps;
        assert!(touches, "{}", kind);
    }
}

#[test]
fn test_empty_layout_keeps_viewport() {
    for kind in RendererKind::ALL {
        let mut renderer = create_renderer(kind, &RendererConfig::default()).unwrap();
        let before = *renderer.viewport();
        renderer.render_layout(&Layout::empty()).unwrap();
        assert_eq!(renderer.object_count(), 0);
        renderer.zoom_fit().unwrap();
        assert_eq!(*renderer.viewport(), before, "{}", kind);
    }
}

#[test]
fn test_disposed_backends_refuse_work() {
    for kind in RendererKind::ALL {
        let mut renderer = create_renderer(kind, &RendererConfig::default()).unwrap();
        renderer.dispose();
        assert!(renderer.is_disposed());
        assert!(renderer.render_layout(&sample_layout()).is_err());
        assert!(renderer.clear().is_err());
        assert!(renderer.zoom_fit().is_err());
        assert_eq!(renderer.object_count(), 0);
    }
}

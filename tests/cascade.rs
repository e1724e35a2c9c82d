mod common;

use common::{ScriptedDetector, det};
use image::DynamicImage;
use ppe_cascade::cascade::{CropSpace, ImageSpace, PixelRect};
use ppe_cascade::{Cascade, CascadeConfig, Finding, extract, run_cascade, to_parent};
use proptest::prelude::*;

#[test]
fn helmet_on_person_near_top_left_corner() {
    let image = DynamicImage::new_rgb8(100, 100);
    let mut persons =
        ScriptedDetector::new(vec![vec![det((10.0, 10.0, 50.0, 50.0), 0, "person", 0.9)]]);
    let mut ppe = ScriptedDetector::new(vec![vec![det((5.0, 5.0, 15.0, 15.0), 0, "Helmet", 0.8)]]);
    let ppe_calls = ppe.calls();

    let out = run_cascade(&image, &mut persons, &mut ppe, &CascadeConfig::default()).unwrap();

    assert_eq!(out.persons, vec![Finding::new(PixelRect::new(10, 10, 50, 50), "Person", 0.9)]);
    assert_eq!(out.ppe, vec![Finding::new(PixelRect::new(5, 5, 15, 15), "Helmet", 0.8)]);
    assert_eq!(*ppe_calls.borrow(), vec![(70, 70)]);
}

#[test]
fn hats_from_person_model_never_reach_output() {
    let image = DynamicImage::new_rgb8(300, 300);
    let mut persons = ScriptedDetector::new(vec![vec![
        det((20.0, 20.0, 80.0, 200.0), 0, "person", 0.9),
        det((30.0, 10.0, 60.0, 40.0), 1, "hat", 0.99),
        det((150.0, 20.0, 220.0, 250.0), 0, "person", 0.6),
    ]]);
    let mut ppe = ScriptedDetector::default();
    let ppe_calls = ppe.calls();

    let out = run_cascade(&image, &mut persons, &mut ppe, &CascadeConfig::default()).unwrap();

    assert_eq!(out.persons.len(), 2);
    assert!(out.persons.iter().all(|f| f.label == "Person"));
    assert_eq!(out.persons[1].confidence, 0.6);
    // 每个人物调用一次装备检测
    assert_eq!(ppe_calls.borrow().len(), 2);
}

#[test]
fn person_outside_image_is_kept_without_ppe_call() {
    let image = DynamicImage::new_rgb8(640, 480);
    let outside = det((-100.0, -100.0, -50.0, -50.0), 0, "person", 0.5);
    let mut persons = ScriptedDetector::new(vec![vec![outside]]);
    let mut ppe = ScriptedDetector::always(vec![det((0.0, 0.0, 5.0, 5.0), 0, "Helmet", 0.9)]);
    let ppe_calls = ppe.calls();

    let out = run_cascade(&image, &mut persons, &mut ppe, &CascadeConfig::default()).unwrap();

    assert_eq!(out.persons.len(), 1);
    assert!(out.ppe.is_empty());
    assert!(ppe_calls.borrow().is_empty());
}

#[test]
fn ppe_from_several_persons_is_aggregated_in_order() {
    let image = DynamicImage::new_rgb8(640, 480);
    let mut persons = ScriptedDetector::new(vec![vec![
        det((100.0, 100.0, 200.0, 300.0), 0, "person", 0.9),
        det((600.0, 400.0, 630.0, 470.0), 0, "person", 0.8),
    ]]);
    let mut ppe = ScriptedDetector::new(vec![
        vec![
            det((30.0, 25.0, 70.0, 55.0), 0, "Helmet", 0.7),
            det((20.0, 80.0, 120.0, 180.0), 1, "Vest", 0.65),
        ],
        vec![det((0.0, 0.0, 60.0, 100.0), 1, "Vest", 0.4)],
    ]);

    let mut cascade = Cascade::new(&mut persons, &mut ppe);
    let out = cascade.run(&image).unwrap();

    let coords: Vec<_> = out.ppe.iter().map(|f| (f.label.as_str(), f.rect.coords())).collect();
    assert_eq!(
        coords,
        vec![
            ("Helmet", (110, 105, 150, 135)),
            ("Vest", (100, 160, 200, 260)),
            // 第二个人物在右下角被裁剪，整块子图还原为有效区域本身
            ("Vest", (580, 380, 640, 480)),
        ]
    );
}

#[test]
fn fractional_boxes_truncate_like_pixel_indices() {
    let image = DynamicImage::new_rgb8(200, 200);
    let fractional = det((40.9, 40.2, 120.7, 180.99), 0, "person", 0.9);
    let mut persons = ScriptedDetector::new(vec![vec![fractional]]);
    let mut ppe = ScriptedDetector::new(vec![vec![det((10.8, 4.4, 30.6, 20.9), 0, "Helmet", 0.8)]]);
    let ppe_calls = ppe.calls();

    let out = run_cascade(&image, &mut persons, &mut ppe, &CascadeConfig::default()).unwrap();

    assert_eq!(out.persons[0].rect.coords(), (40, 40, 120, 180));
    // 有效区域 (20, 20, 140, 200)
    assert_eq!(*ppe_calls.borrow(), vec![(120, 180)]);
    assert_eq!(out.ppe[0].rect.coords(), (30, 24, 50, 40));
}

proptest! {
    #[test]
    fn effective_box_stays_inside_image(
        width in 1u32..800,
        height in 1u32..800,
        x1 in -2000i32..2000,
        y1 in -2000i32..2000,
        w in -50i32..1500,
        h in -50i32..1500,
        padding in 0u32..5000,
    ) {
        let image = DynamicImage::new_luma8(width, height);
        let bbox = PixelRect::<ImageSpace>::new(x1, y1, x1 + w, y1 + h);
        if let Some(region) = extract(&image, &bbox, padding) {
            let e = region.effective;
            prop_assert!(0 <= e.x_min && e.x_min < e.x_max && e.x_max <= width as i32);
            prop_assert!(0 <= e.y_min && e.y_min < e.y_max && e.y_max <= height as i32);
            prop_assert_eq!(region.dimensions(), (e.width() as u32, e.height() as u32));
        }
    }

    #[test]
    fn remap_is_a_pure_offset_without_scaling(
        ox in 0i32..1000,
        oy in 0i32..1000,
        w in 1i32..500,
        h in 1i32..500,
        x1 in 0i32..500,
        y1 in 0i32..500,
        x2 in 0i32..500,
        y2 in 0i32..500,
    ) {
        let effective = PixelRect::<ImageSpace>::new(ox, oy, ox + w, oy + h);
        let crop = PixelRect::<CropSpace>::new(x1, y1, x2, y2);
        let mapped = to_parent(&crop, &effective, (w as u32, h as u32));
        prop_assert_eq!(mapped.coords(), (ox + x1, oy + y1, ox + x2, oy + y2));
    }

    #[test]
    fn full_crop_round_trips_to_effective_box(
        ox in 0i32..1000,
        oy in 0i32..1000,
        w in 1u32..500,
        h in 1u32..500,
        crop_w in 1u32..500,
        crop_h in 1u32..500,
    ) {
        let effective = PixelRect::<ImageSpace>::new(ox, oy, ox + w as i32, oy + h as i32);
        let full = PixelRect::<CropSpace>::new(0, 0, crop_w as i32, crop_h as i32);
        let mapped = to_parent(&full, &effective, (crop_w, crop_h));
        prop_assert_eq!(mapped, effective);
    }
}

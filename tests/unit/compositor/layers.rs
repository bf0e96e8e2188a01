use super::*;
use crate::animation::color::RgbColor;
use crate::animation::element::{AnimatedShapeInfo, BoundsInfo};

const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

// 100x100 slide drawn onto 10x10 pixels; the shape covers pixels 2..4 on both axes.
fn shape() -> ElementRef {
    let info = AnimatedShapeInfo {
        bounds: BoundsInfo {
            x: 20.0,
            y: 20.0,
            width: 20.0,
            height: 20.0,
        },
        init_visible: true,
        fill_color: Some("#ff0000".to_owned()),
        line_color: None,
        font_color: None,
    };
    let mut element = AnimatedElement::new("shape", 100.0, 100.0);
    element.notify_slide_start(Some(&info));
    element.into_ref()
}

fn red_bitmap() -> Rc<RgbaImage> {
    Rc::new(RgbaImage::from_pixel(2, 2, RED))
}

fn drawn(element: &ElementRef) -> RgbaImage {
    let mut target = RgbaImage::from_pixel(10, 10, BLUE);
    draw_layer(&mut target, &element.borrow(), &red_bitmap());
    target
}

fn covered(image: &RgbaImage, color: Rgba<u8>) -> Vec<(u32, u32)> {
    image
        .enumerate_pixels()
        .filter(|(_, _, px)| **px == color)
        .map(|(x, y, _)| (x, y))
        .collect()
}

#[test]
fn shape_lands_on_its_bounding_box() {
    let element = shape();
    let frame = drawn(&element);
    assert_eq!(covered(&frame, RED), vec![(2, 2), (3, 2), (2, 3), (3, 3)]);
}

#[test]
fn moved_shape_follows_its_transform() {
    let element = shape();
    element.borrow_mut().set_pos(Point::new(70.0, 70.0));
    let frame = drawn(&element);
    assert_eq!(covered(&frame, RED), vec![(6, 6), (7, 6), (6, 7), (7, 7)]);
    assert_eq!(*frame.get_pixel(2, 2), BLUE);
}

#[test]
fn scaled_shape_grows_around_its_center() {
    let element = shape();
    element.borrow_mut().set_size(40.0, 20.0);
    let frame = drawn(&element);
    let red = covered(&frame, RED);
    assert_eq!(red.len(), 8);
    assert!(red.contains(&(1, 2)) && red.contains(&(4, 3)));
}

#[test]
fn opacity_blends_with_the_background() {
    let element = shape();
    element.borrow_mut().set_opacity(0.5);
    let px = *drawn(&element).get_pixel(2, 2);
    for (channel, expected) in px.0.iter().zip([128u8, 0, 128, 255]) {
        assert!(channel.abs_diff(expected) <= 1, "{px:?}");
    }
}

#[test]
fn hidden_or_transparent_shapes_draw_nothing() {
    let background = RgbaImage::from_pixel(10, 10, BLUE);

    let element = shape();
    element.borrow_mut().set_visible(false);
    assert_eq!(drawn(&element), background);

    let element = shape();
    element.borrow_mut().set_opacity(0.0);
    assert_eq!(drawn(&element), background);
}

#[test]
fn dimmed_shape_is_recolored() {
    let element = shape();
    element
        .borrow_mut()
        .set_dim_color(RgbColor::from_bytes(0, 255, 0));
    let frame = drawn(&element);
    assert_eq!(*frame.get_pixel(3, 3), Rgba([0, 255, 0, 255]));
    assert!(covered(&frame, RED).is_empty());
}

#[test]
fn over_keeps_destination_for_clear_sources() {
    assert_eq!(over(BLUE, Rgba([255, 0, 0, 0]), 1.0), BLUE);
    assert_eq!(over(BLUE, RED, 1.0), RED);
    assert_eq!(over(BLUE, RED, 0.0), BLUE);
}

#[test]
fn compositor_paints_layers_over_the_slide() {
    let backgrounds: Vec<Rc<RgbaImage>> = vec![
        Rc::new(RgbaImage::from_pixel(10, 10, BLUE)),
        Rc::new(RgbaImage::from_pixel(10, 10, BLUE)),
    ];
    let untouched = backgrounds[1].clone();
    let mut layers = LayerCompositor::new(Box::new(backgrounds));
    let element = shape();
    layers.add_layer(0, element.clone(), red_bitmap());
    assert_eq!(layers.layer_count(0), 1);
    assert_eq!(layers.layer_count(1), 0);

    let frame = layers.get_slide(0).unwrap();
    assert_eq!(*frame.get_pixel(2, 2), RED);
    assert!(Rc::ptr_eq(&layers.get_slide(1).unwrap(), &untouched));

    // each frame picks up the element's current state
    element.borrow_mut().set_visible(false);
    assert_eq!(*layers.get_slide(0).unwrap().get_pixel(2, 2), BLUE);

    layers.clear_layers(0);
    assert_eq!(layers.layer_count(0), 0);
    assert!(layers.get_slide(2).is_none());
}

use super::*;
use std::cell::RefCell;
use std::io::Cursor;

use crate::handler::presentation::SlideInfo;

#[derive(Debug, Default, Clone)]
struct Requests(Rc<RefCell<Vec<usize>>>);

impl PreviewRequester for Requests {
    fn request_preview(&mut self, slide: usize, _width: u32, _height: u32) {
        self.0.borrow_mut().push(slide);
    }
}

fn presentation(slides: usize) -> PresentationInfo {
    PresentationInfo {
        slides: (0..slides)
            .map(|i| SlideInfo {
                hash: format!("hash{i}"),
                index: i,
                ..SlideInfo::default()
            })
            .collect(),
        width: 4,
        height: 3,
    }
}

fn png_data_url(color: [u8; 4]) -> String {
    let image = RgbaImage::from_pixel(4, 3, image::Rgba(color));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(bytes))
}

fn message(part: usize, color: [u8; 4]) -> PreviewMessage {
    PreviewMessage {
        part,
        tile: PreviewTile {
            src: png_data_url(color),
        },
    }
}

#[test]
fn decodes_png_data_urls() {
    let image = decode_data_url(&png_data_url([10, 20, 30, 255])).unwrap();
    assert_eq!(image.dimensions(), (4, 3));
    assert_eq!(image.get_pixel(2, 1).0, [10, 20, 30, 255]);

    assert!(decode_data_url("http://example.com/a.png").is_err());
    assert!(decode_data_url("data:image/png,abc").is_err());
    assert!(decode_data_url("data:image/png;base64,!!!").is_err());
}

#[test]
fn callback_fires_once_when_the_slide_arrives() {
    let requests = Requests::default();
    let mut compositor = PreviewsCompositor::new(&presentation(3), Box::new(requests.clone()));
    let fired = Rc::new(RefCell::new(Vec::new()));

    let seen = fired.clone();
    compositor
        .fetch_and_run(1, Box::new(move |_: &mut PreviewsCompositor, bitmap: Rc<RgbaImage>| seen.borrow_mut().push(bitmap.dimensions())))
        .unwrap();
    assert_eq!(*requests.0.borrow(), vec![1]);

    compositor.on_got_preview(&message(0, [0, 0, 0, 255])).unwrap();
    assert!(fired.borrow().is_empty());
    compositor.on_got_preview(&message(1, [0, 0, 0, 255])).unwrap();
    compositor.on_got_preview(&message(1, [0, 0, 0, 255])).unwrap();
    assert_eq!(*fired.borrow(), vec![(4, 3)]);
}

#[test]
fn callbacks_may_fetch_again() {
    let requests = Requests::default();
    let mut compositor = PreviewsCompositor::new(&presentation(3), Box::new(requests.clone()));
    let fired = Rc::new(RefCell::new(0));

    let outer = fired.clone();
    compositor
        .fetch_and_run(
            0,
            Box::new(move |c: &mut PreviewsCompositor, _: Rc<RgbaImage>| {
                *outer.borrow_mut() += 1;
                let inner = outer.clone();
                c.fetch_and_run(2, Box::new(move |_: &mut PreviewsCompositor, _: Rc<RgbaImage>| *inner.borrow_mut() += 10))
                    .unwrap();
            }),
        )
        .unwrap();
    compositor.on_got_preview(&message(0, [1, 1, 1, 255])).unwrap();
    assert_eq!(*fired.borrow(), 1);
    assert_eq!(*requests.0.borrow(), vec![0, 2]);
    compositor.on_got_preview(&message(2, [1, 1, 1, 255])).unwrap();
    assert_eq!(*fired.borrow(), 11);
}

#[test]
fn get_slide_prefetches_the_next_one() {
    let requests = Requests::default();
    let mut compositor = PreviewsCompositor::new(&presentation(2), Box::new(requests.clone()));
    assert!(compositor.get_slide(0).is_none());
    assert_eq!(*requests.0.borrow(), vec![1]);
    assert!(compositor.get_slide(0).is_none());
    assert_eq!(*requests.0.borrow(), vec![1]);
    assert!(compositor.get_slide(1).is_none());
    assert_eq!(requests.0.borrow().len(), 1);
}

#[test]
fn out_of_order_previews_land_by_index() {
    let mut compositor = PreviewsCompositor::new(&presentation(3), Box::new(Requests::default()));
    compositor.on_got_preview(&message(2, [9, 9, 9, 255])).unwrap();
    compositor.on_got_preview(&message(0, [1, 1, 1, 255])).unwrap();
    assert_eq!(compositor.get_slide(2).unwrap().get_pixel(0, 0).0, [9, 9, 9, 255]);
    assert_eq!(compositor.get_slide(0).unwrap().get_pixel(0, 0).0, [1, 1, 1, 255]);
    assert!(compositor.cache().has("hash2"));
    assert!(compositor.on_got_preview(&message(7, [0, 0, 0, 255])).is_err());

    compositor.invalidate(2);
    assert!(!compositor.cache().has("hash2"));
    assert!(compositor.get_slide(2).is_none());
}

#[test]
fn messages_deserialize_from_json() {
    let msg: PreviewMessage =
        serde_json::from_str(r#"{"part": 3, "tile": {"src": "data:image/png;base64,AA=="}}"#).unwrap();
    assert_eq!(msg.part, 3);
    assert!(msg.tile.src.starts_with("data:"));
}

#[test]
fn broken_preview_is_requested_again() {
    let requests = Requests::default();
    let mut compositor = PreviewsCompositor::new(&presentation(2), Box::new(requests.clone()));
    let fired = Rc::new(RefCell::new(0));

    compositor
        .fetch_and_run(0, Box::new(|_: &mut PreviewsCompositor, _: Rc<RgbaImage>| {}))
        .unwrap();
    let broken = PreviewMessage {
        part: 0,
        tile: PreviewTile {
            src: "data:image/png;base64,AAAA".into(),
        },
    };
    assert!(compositor.on_got_preview(&broken).is_err());
    assert!(compositor.get_slide(0).is_none());

    let seen = fired.clone();
    compositor
        .fetch_and_run(0, Box::new(move |_: &mut PreviewsCompositor, _: Rc<RgbaImage>| *seen.borrow_mut() += 1))
        .unwrap();
    assert_eq!(*requests.0.borrow(), vec![0, 1, 0]);

    compositor.on_got_preview(&message(0, [5, 5, 5, 255])).unwrap();
    assert_eq!(*fired.borrow(), 1);
}

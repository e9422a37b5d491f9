use super::*;

fn canvas() -> Canvas {
    Canvas {
        width: 8,
        height: 6,
    }
}

fn fps() -> Fps {
    Fps::new(30, 1).unwrap()
}

#[test]
fn blank_source_yields_exactly_count_frames() {
    let mut src = InMemorySource::blank(canvas(), fps(), 3);
    assert_eq!(src.remaining(), 3);
    for _ in 0..3 {
        let f = src.next_frame().unwrap().unwrap();
        assert_eq!(f.dimensions(), (8, 6));
        assert_eq!(f.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }
    assert!(src.next_frame().unwrap().is_none());
    assert!(src.next_frame().unwrap().is_none());
}

#[test]
fn in_memory_source_rejects_mismatched_frames() {
    let frames = vec![RgbaImage::new(8, 6), RgbaImage::new(4, 4)];
    let err = InMemorySource::new(canvas(), fps(), frames).unwrap_err();
    assert!(matches!(err, PoseAlignError::Validation(_)));
}

#[test]
fn borrowed_source_forwards_to_the_owner() {
    let mut src = InMemorySource::blank(canvas(), fps(), 1);
    {
        let borrowed: &mut InMemorySource = &mut src;
        assert_eq!(FrameSource::canvas(&borrowed), canvas());
        assert!(borrowed.next_frame().unwrap().is_some());
    }
    assert_eq!(src.remaining(), 0);
}

#[test]
fn opening_a_missing_video_is_an_io_error() {
    let err = FfmpegFrameSource::open(Path::new("no/such/video.mp4"))
        .err()
        .unwrap();
    assert!(err.is_io());
}

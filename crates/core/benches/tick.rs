use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pump_core::graphics::Canvas;
use pump_core::input::{Axis, Button, LogicalInput};
use pump_core::scene::BLUE;
use pump_core::{Adapter, FrameView, Host, PixelBuffer, PixelFormat};

/// Host that accepts everything and discards frames
struct NullHost {
    format: PixelFormat,
    frame: u32,
}

impl NullHost {
    fn new(format: PixelFormat) -> Self {
        Self { format, frame: 0 }
    }
}

impl Host for NullHost {
    fn poll_inputs(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    fn input_state(&mut self, input: LogicalInput) -> i16 {
        // Toggle A every few frames and drift the cursor
        match input {
            LogicalInput::Button(Button::A) => ((self.frame / 4) % 2) as i16,
            LogicalInput::Axis(Axis::CursorX) => 3,
            LogicalInput::Axis(Axis::CursorY) => -1,
            LogicalInput::Button(_) => 0,
        }
    }

    fn present_frame(&mut self, frame: FrameView<'_>) {
        black_box(frame.data);
    }

    fn emit_audio_sample(&mut self, _left: i16, _right: i16) {}

    fn set_pixel_format(&mut self, format: PixelFormat) -> bool {
        format == self.format
    }

    fn variable(&mut self, key: &str) -> Option<String> {
        match key {
            pump_core::config::PIXEL_FORMAT_KEY => Some(self.format.option_value().to_string()),
            pump_core::config::LOG_LEVEL_KEY => Some("error".to_string()),
            _ => None,
        }
    }

    fn variables_updated(&mut self) -> bool {
        false
    }

    fn request_shutdown(&mut self) {}
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("adapter_tick");

    for format in [PixelFormat::Rgb565, PixelFormat::Xrgb8888] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format.option_value()),
            &format,
            |b, &format| {
                let mut host = NullHost::new(format);
                let mut adapter = Adapter::new();
                adapter.initialize();
                adapter.load_session(&mut host).expect("load");
                b.iter(|| black_box(adapter.tick(&mut host)));
            },
        );
    }

    group.finish();
}

fn bench_canvas(c: &mut Criterion) {
    let mut group = c.benchmark_group("canvas");

    group.bench_function("fill_circle_r30", |b| {
        let mut buf = PixelBuffer::new(400, 225, PixelFormat::Rgb565).unwrap();
        b.iter(|| {
            buf.fill_circle(200, 150, black_box(30), BLUE);
        });
    });

    group.bench_function("line_diagonal", |b| {
        let mut buf = PixelBuffer::new(400, 225, PixelFormat::Xrgb8888).unwrap();
        b.iter(|| {
            buf.line(0, 0, black_box(399), 224, BLUE);
        });
    });

    group.finish();
}

fn bench_load_cycle(c: &mut Criterion) {
    c.bench_function("load_unload", |b| {
        let mut host = NullHost::new(PixelFormat::Rgb565);
        let mut adapter = Adapter::new();
        adapter.initialize();
        b.iter(|| {
            adapter.load_session(&mut host).expect("load");
            adapter.unload_session();
        });
    });
}

criterion_group!(benches, bench_tick, bench_canvas, bench_load_cycle);
criterion_main!(benches);

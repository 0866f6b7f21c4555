mod tests {
    use embassy_time::{Duration, Instant};
    use pulsefield::color::Rgb;
    use pulsefield::envelope::{
        ColorMode, EnvelopeRenderer, EnvelopeTimings, Phase, phase_at,
    };
    use pulsefield::events::{EventPool, Pulse, Ring, Segment};
    use pulsefield::gate::Category;
    use pulsefield::palette::PaletteId;

    const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
    const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    fn is_lit(c: Rgb) -> bool {
        c.r > 0 || c.g > 0 || c.b > 0
    }

    #[test]
    fn test_phase_boundaries() {
        let timings = EnvelopeTimings::default();
        assert_eq!(timings.total(), Duration::from_millis(570));

        assert_eq!(phase_at(Duration::from_millis(0), &timings), Some(Phase::Flash));
        assert_eq!(phase_at(Duration::from_millis(59), &timings), Some(Phase::Flash));
        assert_eq!(phase_at(Duration::from_millis(60), &timings), Some(Phase::Hold));
        assert_eq!(phase_at(Duration::from_millis(309), &timings), Some(Phase::Hold));
        assert_eq!(
            phase_at(Duration::from_millis(310), &timings),
            Some(Phase::Fade { fade_v: 255 })
        );
        assert_eq!(phase_at(Duration::from_millis(570), &timings), None);
        assert_eq!(phase_at(Duration::from_millis(10_000), &timings), None);
    }

    #[test]
    fn test_fade_brightness_decreases() {
        let timings = EnvelopeTimings::default();
        let early = phase_at(Duration::from_millis(320), &timings);
        let late = phase_at(Duration::from_millis(560), &timings);
        let (Some(Phase::Fade { fade_v: v_early }), Some(Phase::Fade { fade_v: v_late })) =
            (early, late)
        else {
            panic!("expected fade phases");
        };
        assert!(v_late < v_early);
    }

    fn spawn_segment(peak: u8) -> EventPool<Segment, 8> {
        let mut pool = EventPool::new();
        pool.spawn(
            Segment {
                origin: 10,
                length: 5,
                category: Category::Bass,
                peak,
            },
            Instant::from_millis(0),
        );
        pool
    }

    #[test]
    fn test_segment_hold_writes_mirrored_channels() {
        let renderer = EnvelopeRenderer {
            color_mode: ColorMode::MonoAccent,
            ..EnvelopeRenderer::default()
        };
        let pool = spawn_segment(255);
        let ramp = PaletteId::TealMagenta.ramp();
        let mut ch1 = [BLACK; 60];
        let mut ch2 = [BLACK; 60];

        // Hold phase
        renderer.render_segments(
            Instant::from_millis(100),
            &pool,
            ramp,
            PaletteId::TealMagenta,
            &mut ch1,
            &mut ch2,
        );

        for p in 10..15 {
            assert!(is_lit(ch1[p]));
            // Channel 2 mirrors channel 1's position
            assert_eq!(ch2[59 - p], ch1[p]);
        }
        assert_eq!(ch1[9], BLACK);
        assert_eq!(ch1[15], BLACK);
    }

    #[test]
    fn test_segment_edges_are_white_during_attack() {
        let renderer = EnvelopeRenderer::default();
        let pool = spawn_segment(255);
        let ramp = PaletteId::TealMagenta.ramp();
        let mut ch1 = [BLACK; 60];
        let mut ch2 = [BLACK; 60];

        renderer.render_segments(
            Instant::from_millis(100),
            &pool,
            ramp,
            PaletteId::TealMagenta,
            &mut ch1,
            &mut ch2,
        );
        assert_eq!(ch1[10], WHITE);
        assert_eq!(ch1[14], WHITE);

        // Disabled: edges render like interior pixels
        let no_edge = EnvelopeRenderer {
            edge_white: false,
            ..EnvelopeRenderer::default()
        };
        let mut ch1b = [BLACK; 60];
        let mut ch2b = [BLACK; 60];
        no_edge.render_segments(
            Instant::from_millis(100),
            &pool,
            ramp,
            PaletteId::TealMagenta,
            &mut ch1b,
            &mut ch2b,
        );
        assert_ne!(ch1b[10], WHITE);
    }

    #[test]
    fn test_segment_fade_blends_over_background() {
        let renderer = EnvelopeRenderer {
            color_mode: ColorMode::MonoAccent,
            edge_white: false,
            ..EnvelopeRenderer::default()
        };
        let pool = spawn_segment(255);
        let ramp = PaletteId::TealMagenta.ramp();

        let background = Rgb {
            r: 40,
            g: 40,
            b: 40,
        };
        let mut ch1 = [background; 60];
        let mut ch2 = [background; 60];

        // Late fade: the event is nearly gone, so the pixel should sit close
        // to the background rather than overwrite it.
        renderer.render_segments(
            Instant::from_millis(560),
            &pool,
            ramp,
            PaletteId::TealMagenta,
            &mut ch1,
            &mut ch2,
        );
        assert!(ch1[12].g < background.g + 20);
        // Untouched pixels keep the background exactly
        assert_eq!(ch1[0], background);
    }

    #[test]
    fn test_expired_segment_renders_nothing() {
        let renderer = EnvelopeRenderer::default();
        let pool = spawn_segment(255);
        let ramp = PaletteId::TealMagenta.ramp();
        let mut ch1 = [BLACK; 60];
        let mut ch2 = [BLACK; 60];

        renderer.render_segments(
            Instant::from_millis(600),
            &pool,
            ramp,
            PaletteId::TealMagenta,
            &mut ch1,
            &mut ch2,
        );
        assert!(ch1.iter().all(|&c| c == BLACK));
        assert!(ch2.iter().all(|&c| c == BLACK));
    }

    #[test]
    fn test_ring_expands_and_dies() {
        let renderer = EnvelopeRenderer::default();
        let mut pool: EventPool<Ring, 10> = EventPool::new();
        pool.spawn(
            Ring {
                center: 30,
                category: Category::Bass,
                peak: 255,
            },
            Instant::from_millis(0),
        );
        let ramp = PaletteId::TealMagenta.ramp();

        // At 100ms the radius is 18px: pixels near the center are dark,
        // pixels around center +/- 18 are lit.
        let mut ch1 = [BLACK; 120];
        let mut ch2 = [BLACK; 120];
        renderer.render_rings(
            Instant::from_millis(100),
            &pool,
            ramp,
            PaletteId::TealMagenta,
            &mut ch1,
            &mut ch2,
        );
        assert!(is_lit(ch1[48]));
        assert!(is_lit(ch1[12]));
        assert_eq!(ch1[30], BLACK);

        // Past the fade lifetime nothing renders
        let mut ch1b = [BLACK; 120];
        let mut ch2b = [BLACK; 120];
        renderer.render_rings(
            Instant::from_millis(950),
            &pool,
            ramp,
            PaletteId::TealMagenta,
            &mut ch1b,
            &mut ch2b,
        );
        assert!(ch1b.iter().all(|&c| c == BLACK));
    }

    #[test]
    fn test_pulse_travels_on_its_channel_only() {
        let renderer = EnvelopeRenderer::default();
        let mut pool: EventPool<Pulse, 6> = EventPool::new();
        pool.spawn(
            Pulse {
                origin: 20,
                forward: true,
                channel: 0,
            },
            Instant::from_millis(0),
        );
        let ramp = PaletteId::Ember.ramp();

        // 400ms at 200 px/s puts the window center at pixel 100
        let mut ch1 = [BLACK; 200];
        let mut ch2 = [BLACK; 200];
        renderer.render_pulses(Instant::from_millis(400), &pool, ramp, &mut ch1, &mut ch2);

        assert!(ch1[90..=110].iter().any(|&c| is_lit(c)));
        assert!(ch1[..80].iter().all(|&c| c == BLACK));
        assert!(ch2.iter().all(|&c| c == BLACK));
    }
}

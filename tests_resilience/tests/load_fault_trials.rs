//! Randomized Fault Trials
//!
//! Seeded trials drive the loader against the simulated platform with a
//! randomly chosen fault point (or none) and randomly selected targets.
//! After every trial, two invariants must hold regardless of outcome:
//! - no file or region handle is left behind
//! - the response is either the success shape or the opcode-0 error shape

use services_hbx_loader::LoaderService;
use sim_platform::{FaultPoint, FaultPolicy, SimPlatform};
use tests_resilience::{load_command, XorShift32};
use wire::{static_buffer, CommandBuffer, Header, RequestPayload};

const TRIALS: u32 = 1000;
const SEED: u32 = 0x1B5E_ED01;

const KNOWN_IMAGES: [&str; 3] = ["/boot.hbx", "/apps/paint.hbx", "/apps/music.hbx"];

fn trial_platform(generator: &mut XorShift32) -> SimPlatform {
    let mut platform = SimPlatform::new();
    for path in KNOWN_IMAGES {
        // Image sizes vary across page boundaries.
        let size = 1 + generator.pick(0x8000);
        platform = platform.add_image(path, size);
    }
    platform
}

fn random_fault(generator: &mut XorShift32) -> FaultPolicy {
    if generator.one_in(2) {
        return FaultPolicy::Never;
    }
    let point = FaultPoint::ALL[generator.pick(FaultPoint::ALL.len() as u32) as usize];
    FaultPolicy::At(point)
}

fn maybe_select_target(
    generator: &mut XorShift32,
    service: &mut LoaderService,
    platform: &mut SimPlatform,
) {
    if generator.one_in(3) {
        return; // leave the slot empty, load falls back to the default
    }
    // Sometimes a path that exists, sometimes one that does not.
    let path: &[u8] = if generator.one_in(4) {
        b"/apps/missing.hbx"
    } else {
        KNOWN_IMAGES[generator.pick(KNOWN_IMAGES.len() as u32) as usize].as_bytes()
    };
    let mut cmdbuf = CommandBuffer::request(Header::new(2, 0, 2));
    cmdbuf.set_word(1, static_buffer(path.len(), 0));
    service.handle_command(
        platform,
        &mut cmdbuf,
        RequestPayload::StaticBuffer { slot: 0, bytes: path },
    );
}

#[test]
fn test_no_trial_leaks_handles() {
    let mut generator = XorShift32::new(SEED);
    for trial in 0..TRIALS {
        let mut platform = trial_platform(&mut generator);
        let mut service = LoaderService::new();

        maybe_select_target(&mut generator, &mut service, &mut platform);
        platform.set_fault(random_fault(&mut generator));

        let mut cmdbuf = load_command(0x0010_8000);
        service.handle_command(&mut platform, &mut cmdbuf, RequestPayload::None);

        assert_eq!(
            platform.open_file_count(),
            0,
            "trial {trial}: leaked file handle"
        );
        assert_eq!(
            platform.mapped_region_count(),
            0,
            "trial {trial}: leaked region"
        );

        let header = cmdbuf.header();
        if cmdbuf.status().is_success() {
            assert_eq!(header, Header::new(1, 1, 2), "trial {trial}");
            assert_eq!(platform.codeset_count(), 1, "trial {trial}");
        } else {
            assert_eq!(header, Header::new(0, 1, 0), "trial {trial}");
            assert_eq!(platform.codeset_count(), 0, "trial {trial}");
        }

        // The slot is consumed by every load attempt.
        assert!(service.target().is_empty(), "trial {trial}");
    }
}

#[test]
fn test_back_to_back_loads_on_one_session() {
    let mut generator = XorShift32::new(SEED ^ 0x5A5A_5A5A);
    let mut platform = trial_platform(&mut generator);
    let mut service = LoaderService::new();

    let mut successes = 0;
    for _ in 0..200 {
        maybe_select_target(&mut generator, &mut service, &mut platform);
        platform.set_fault(random_fault(&mut generator));

        let mut cmdbuf = load_command(0x0010_8000);
        service.handle_command(&mut platform, &mut cmdbuf, RequestPayload::None);
        if cmdbuf.status().is_success() {
            successes += 1;
        }

        assert_eq!(platform.open_file_count(), 0);
        assert_eq!(platform.mapped_region_count(), 0);
    }

    // With a coin-flip fault policy some loads must land on both sides.
    assert!(successes > 0);
    assert_eq!(platform.codeset_count(), successes);
}

use anyhow::Result;
use rstest::rstest;

use wib::prelude::*;
use wib_core::command::Request;
use wib_emulator::{EMULATED_VERSION, WibEmulator};

fn session() -> Session<WibEmulator> {
    tracing_subscriber::fmt()
        .with_test_writer()
        .try_init()
        .ok();
    Session::new(WibEmulator::new())
}

fn quiet_channel() -> ChannelSettings {
    ChannelSettings {
        test_cap: TestCap::On,
        baseline: Baseline::Mv200,
        gain: Gain::Mv14,
        peaking_time: PeakingTime::Us1,
        monitor: ChannelMonitor::Off,
        buffer: ChannelBuffer::Off,
    }
}

#[test]
fn channel_write_lands_and_latches() -> Result<()> {
    let mut session = session();
    let chip = ChipAddress::new(2, 1, 3);
    session.write_channel(chip, 5, &quiet_channel(), false)?;

    let emu = session.into_transport();
    // COLDATA 1 sits at I2C address 2; chip 4's channel 5 register is 135.
    assert_eq!(emu.cd_reg(2, 1, 2, 4, 135), Some(0x03));
    assert_eq!(emu.cd_reg(2, 1, 2, 0, 20), Some(8));
    assert_eq!(emu.requests().len(), 2);
    Ok(())
}

#[test]
fn global_write_reaches_both_coldatas() -> Result<()> {
    let mut session = session();
    let chip = ChipAddress::new(1, 0, 1);
    let settings = GlobalSettings {
        pulser_switch: PulserSwitch::Internal,
        pulser_dac: PulserDac::new(0x01)?,
        ..Default::default()
    };
    session.write_global(chip, &settings, false)?;

    let emu = session.into_transport();
    // Chip number 2 behind COLDATA 0 (I2C 3) and COLDATA 1 (I2C 2).
    for (coldata, i2c) in [(0, 3), (1, 2)] {
        assert_eq!(emu.cd_reg(1, coldata, i2c, 2, 146), Some(0b0000_0100));
        assert_eq!(emu.cd_reg(1, coldata, i2c, 2, 147), Some(0b1000_0001));
        assert_eq!(emu.cd_reg(1, coldata, i2c, 0, 20), Some(8));
    }
    Ok(())
}

#[test]
fn pulser_toggle_round_trips_the_flag() -> Result<()> {
    let mut session = session();
    assert!(!session.pulser_on());

    session.set_pulser(true)?;
    assert!(session.pulser_on());
    session.set_pulser(false)?;
    assert!(!session.pulser_on());

    let emu = session.into_transport();
    // Two toggles, one Act each; every COLDATA ends with its switches off.
    assert_eq!(emu.fast_commands(), [FastCommand::Act, FastCommand::Act]);
    for femb in 0..4 {
        assert_eq!(emu.cd_reg(femb, 0, 3, 0, 20), Some(0));
        assert_eq!(emu.cd_reg(femb, 1, 2, 0, 20), Some(0));
    }
    Ok(())
}

#[test]
fn write_refused_while_pulser_on() -> Result<()> {
    let mut session = session();
    session.set_pulser(true)?;

    let err = session
        .write_channel(ChipAddress::new(0, 0, 0), 0, &quiet_channel(), false)
        .unwrap_err();
    assert_eq!(err, WibError::Driver(wib_driver::WibDriverError::PulserEnabled));
    // Refusal happens before any transport traffic: 9 toggle requests only.
    assert_eq!(session.transport().requests().len(), 9);
    Ok(())
}

#[test]
fn auto_toggle_wraps_and_restores() -> Result<()> {
    let mut session = session();
    session.set_pulser(true)?;

    session.write_global(ChipAddress::new(0, 0, 0), &GlobalSettings::default(), true)?;
    assert!(session.pulser_on());

    let emu = session.into_transport();
    // Toggle on, wrap off, global write, restore on: three Acts total and
    // the command register ends at the pulser-on code.
    assert_eq!(emu.fast_commands().len(), 3);
    assert_eq!(emu.cd_reg(0, 0, 3, 0, 20), Some(1));
    Ok(())
}

#[test]
fn failure_mid_sequence_stops_the_rest() -> Result<()> {
    let chip = ChipAddress::new(0, 0, 0);
    let channels = [quiet_channel(); 16];

    // Let two channel writes through, refuse the third.
    let mut emu = WibEmulator::new();
    emu.fail_after_cd_pokes(2);
    let mut session = Session::new(emu);

    let err = session
        .write_all_channels(chip, &channels, &GlobalSettings::default(), false)
        .unwrap_err();

    match &err {
        WibError::SequenceAborted {
            step,
            total,
            what,
            source,
        } => {
            assert_eq!((*step, *total), (3, 26));
            // Channel 2 lives at register 132.
            assert!(what.contains("0x84"), "step description: {what}");
            assert!(matches!(source, TransportError::Refused(_)));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(err.to_string().contains("applied up to step 2 of 26"));

    let emu = session.into_transport();
    assert_eq!(emu.cd_reg(0, 0, 3, 1, 130), Some(0x03));
    assert_eq!(emu.cd_reg(0, 0, 3, 1, 131), Some(0x03));
    for reg in 132..=145 {
        assert_eq!(emu.cd_reg(0, 0, 3, 1, reg), None);
    }
    // No latch was ever issued.
    assert_eq!(emu.cd_reg(0, 0, 3, 0, 20), None);
    assert!(emu.fast_commands().is_empty());
    Ok(())
}

#[test]
fn failed_toggle_leaves_flag_at_last_confirmed_state() -> Result<()> {
    let mut emu = WibEmulator::new();
    emu.fail_after_cd_pokes(4);
    let mut session = Session::new(emu);

    assert!(session.set_pulser(true).is_err());
    // The toggle never completed, so the session still reports off.
    assert!(!session.pulser_on());
    Ok(())
}

#[test]
fn bulk_apply_translates_and_tracks_pulser() -> Result<()> {
    let mut session = session();
    let mut config = BoardConfig::default();
    config.pulser = true;
    config.femb_configs[0].gain = 2;
    config.femb_configs[0].peak_time = 1;
    config.femb_configs[0].pulse_dac = 0x10;

    session.apply_configuration(&config, &ApplyOptions::default())?;
    assert!(session.pulser_on());

    let emu = session.into_transport();
    let applied = emu.last_configure().expect("configuration reached the board");
    assert_eq!(applied.fembs[0].gain, 3);
    assert_eq!(applied.fembs[0].peak_time, 0);
    assert_eq!(applied.fembs[0].pulse_dac, 0x10);
    assert!(applied.fembs[0].enabled);
    assert!(!applied.fembs[1].enabled);
    assert!(applied.pulser);
    Ok(())
}

#[test]
fn power_sequence_and_rails_reach_the_board() -> Result<()> {
    let mut session = session();
    session.set_pulser(true)?;

    session.power_on(&PowerSequence::single_femb(1, true))?;
    session.configure_power(&PowerRails::default())?;
    // Regulator reconfiguration powers the FEMBs off.
    assert!(!session.pulser_on());

    let emu = session.into_transport();
    let power = emu.last_power().expect("power request");
    assert_eq!(power.femb_on, [false, true, false, false]);
    assert!(power.cold);
    let rails = emu.last_rails().expect("rails request");
    assert_eq!(rails.ldo_a0, 2.5);
    Ok(())
}

#[test]
fn scripts_run_by_text_and_by_name() -> Result<()> {
    let mut session = session();
    session.run_script("delay 0.1\nfast sync\n")?;
    session.run_onboard_script("cdr_reset")?;

    assert_eq!(
        session.run_onboard_script("rm_rf").unwrap_err(),
        WibError::UnknownScript("rm_rf".to_string())
    );

    let emu = session.into_transport();
    assert_eq!(
        emu.scripts(),
        [
            ("delay 0.1\nfast sync\n".to_string(), false),
            ("cdr_reset".to_string(), true),
        ]
    );
    Ok(())
}

#[rstest]
#[case(0xA001_0000)]
#[case(0xA00C_00C0)]
fn peek_poke_inside_the_window(#[case] addr: u32) -> Result<()> {
    let mut session = session();
    assert_eq!(session.peek(addr)?, 0);
    session.poke(addr, 0xCAFE)?;
    assert_eq!(session.peek(addr)?, 0xCAFE);
    Ok(())
}

#[test]
fn peek_outside_the_window_never_hits_the_transport() -> Result<()> {
    let mut session = session();
    assert_eq!(
        session.peek(0x1000).unwrap_err(),
        WibError::AddressOutOfWindow(0x1000)
    );
    assert!(session.transport().requests().is_empty());
    Ok(())
}

#[test]
fn cd_peek_reads_what_was_written() -> Result<()> {
    let mut session = session();
    let chip = ChipAddress::new(3, 0, 2);
    session.write_channel(chip, 0, &quiet_channel(), false)?;
    assert_eq!(session.cd_peek(chip, chip.chip(), 130)?, 0x03);
    Ok(())
}

#[test]
fn version_and_reboot() -> Result<()> {
    let mut session = session();
    assert_eq!(session.sw_version()?, EMULATED_VERSION);
    session.reboot()?;
    assert!(session.transport().rebooted());
    Ok(())
}

#[test]
fn dead_link_surfaces_as_transport_error() {
    let mut emu = WibEmulator::new();
    emu.break_down();
    let mut session = Session::new(emu);
    assert_eq!(
        session.sw_version().unwrap_err(),
        WibError::Transport(TransportError::Closed)
    );
}

#[test]
fn requests_arrive_in_sequence_order() -> Result<()> {
    let mut session = session();
    session.write_channel(ChipAddress::new(0, 0, 0), 3, &quiet_channel(), false)?;

    let emu = session.into_transport();
    let regs: Vec<u8> = emu
        .requests()
        .iter()
        .map(|r| match r {
            Request::CdPoke { reg_addr, .. } => *reg_addr,
            other => panic!("unexpected request {other:?}"),
        })
        .collect();
    assert_eq!(regs, [133, 20]);
    Ok(())
}

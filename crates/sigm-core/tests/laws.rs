//! Undo, redo and paste laws over generated command sequences.

use chrono::NaiveDate;
use proptest::prelude::*;
use sigm_core::{Command, CommandEngine};
use sigm_model::{Core, Metadata, Project, Signal};

fn base_project() -> Project {
    let mut project = Project::new_template(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    project.soc_list.push("SocA".to_string());
    let cores = project.core_info.entry("SocA".to_string()).or_default();
    cores.insert("Core0".to_string(), Core::described("master"));
    cores.insert("Core1".to_string(), Core::described("remote"));
    let mut routed = Signal::new("a");
    routed.source = "SocA.Core0".to_string();
    routed.set_destination("SocA.Core1", true);
    project.signals.insert("a".to_string(), routed);
    project.signals.insert("b".to_string(), Signal::new("b"));
    project
}

fn name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "a_copy", ""]).prop_map(str::to_string)
}

fn soc() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["SocA", "SocB", "Windows", "Bad.Name"]).prop_map(str::to_string)
}

fn core_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["Core0", "Core1", "Core2"]).prop_map(str::to_string)
}

fn signal() -> impl Strategy<Value = Signal> {
    (0u32..=1200, 0u32..=12, prop::option::of(prop::sample::select(vec![
        "SocA.Core0",
        "SocA.Core1",
        "SocB.Core0",
    ])))
        .prop_map(|(timeout, buffers, source)| {
            let mut signal = Signal::new("s");
            signal.timeout = timeout;
            signal.buffer_count_ipc = buffers;
            if let Some(source) = source {
                signal.source = source.to_string();
            }
            signal
        })
}

fn command() -> impl Strategy<Value = Command> {
    prop_oneof![
        name().prop_map(Command::add_signal),
        name().prop_map(|name| Command::DeleteSignal { name }),
        (name(), name()).prop_map(|(from, to)| Command::RenameSignal { from, to }),
        (name(), signal()).prop_map(|(name, signal)| Command::UpdateSignal { name, signal }),
        name().prop_map(|name| Command::CopySignal { name }),
        Just(Command::PasteSignal),
        soc().prop_map(Command::SetSocType),
        soc().prop_map(Command::AddSoc),
        soc().prop_map(Command::RemoveSoc),
        (soc(), core_name()).prop_map(|(soc, core)| Command::AddCore {
            soc,
            core,
            props: Core::default(),
        }),
        (soc(), core_name()).prop_map(|(soc, core)| Command::RemoveCore { soc, core }),
        "[a-z]{0,6}".prop_map(Command::SetBoard),
        "[a-z]{1,6}".prop_map(|editor| {
            let mut metadata = Metadata::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
            metadata.editor = editor;
            Command::UpdateMetadata(metadata)
        }),
    ]
}

proptest! {
    #[test]
    fn every_step_undoes_and_redoes_exactly(commands in prop::collection::vec(command(), 1..16)) {
        let mut engine = CommandEngine::new(base_project());
        for command in commands {
            let before = engine.project().clone();
            let depth = engine.undo_depth();
            let mutating = command.is_mutating();

            match engine.apply(command) {
                Ok(_) if mutating => {
                    let after = engine.project().clone();
                    prop_assert_eq!(engine.undo_depth(), depth + 1);
                    engine.undo().unwrap();
                    prop_assert_eq!(engine.project(), &before);
                    engine.redo().unwrap();
                    prop_assert_eq!(engine.project(), &after);
                    prop_assert!(after.structural_violations().is_empty());
                }
                Ok(_) | Err(_) => {
                    prop_assert_eq!(engine.project(), &before);
                    prop_assert_eq!(engine.undo_depth(), depth);
                }
            }
        }
    }

    #[test]
    fn undoing_everything_restores_the_start(commands in prop::collection::vec(command(), 0..16)) {
        let start = base_project();
        let mut engine = CommandEngine::new(start.clone());
        for command in commands {
            let _ = engine.apply(command);
        }
        while engine.can_undo() {
            engine.undo().unwrap();
        }
        prop_assert_eq!(engine.project(), &start);
    }

    #[test]
    fn paste_adds_one_copy_with_equal_attributes(existing in 0usize..4, pastes in 1usize..5) {
        let mut engine = CommandEngine::new(base_project());
        for n in 0..existing {
            let name = if n == 0 { "a_copy".to_string() } else { format!("a_copy{n}") };
            engine.apply(Command::add_signal(name)).unwrap();
        }
        engine.apply(Command::CopySignal { name: "a".to_string() }).unwrap();

        for _ in 0..pastes {
            let count = engine.project().signals.len();
            engine.apply(Command::PasteSignal).unwrap();
            prop_assert_eq!(engine.project().signals.len(), count + 1);

            let (name, pasted) = engine.project().signals.last().unwrap();
            prop_assert!(name == "a_copy" || name.strip_prefix("a_copy").is_some_and(|n| n.parse::<u32>().is_ok()));
            prop_assert_eq!(pasted, &engine.project().signals["a"]);
        }
    }
}

// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::*;
use crate::{OutputDevice, OutputDeviceExt, ReadlineError, StdoutMock, UnicodeWidthModel};
use pretty_assertions::assert_eq;
use std::{sync::Arc, thread};

fn new_line_buffer(prompt: &str, interactive: bool, screen_width: i32) -> (LineBuffer, StdoutMock) {
    let (output_device, stdout_mock) = OutputDevice::new_mock();
    let line_buffer = LineBuffer::try_new(
        prompt,
        None,
        interactive,
        screen_width,
        output_device,
        Arc::new(UnicodeWidthModel),
    )
    .unwrap();
    (line_buffer, stdout_mock)
}

fn chars(it: &str) -> Vec<char> { it.chars().collect() }

#[test]
fn test_try_new_rejects_invalid_width() {
    let (output_device, _) = OutputDevice::new_mock();
    let result = LineBuffer::try_new(
        "> ",
        None,
        true,
        0,
        output_device,
        Arc::new(UnicodeWidthModel),
    );
    assert_eq!(result.err(), Some(ReadlineError::InvalidScreenWidth(0)));
}

#[test]
fn test_set_screen_width_invalid_leaves_geometry_and_screen_alone() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", true, 80);
    for invalid in [0, -1, i32::MIN] {
        assert_eq!(
            line_buffer.set_screen_width(invalid),
            Err(ReadlineError::InvalidScreenWidth(invalid))
        );
    }
    assert_eq!(line_buffer.screen_width(), 80);
    assert_eq!(stdout_mock.get_copy_of_buffer(), Vec::<u8>::new());

    line_buffer.set_screen_width(40).unwrap();
    assert_eq!(line_buffer.screen_width(), 40);
    assert_eq!(
        stdout_mock.get_copy_of_buffer_as_string(),
        "\x1b[J\x1b[2K\r> "
    );
}

#[test]
fn test_scoped_redraw_is_one_clean_and_one_print() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", true, 80);
    line_buffer.insert(&chars("ab"));
    assert_eq!(
        stdout_mock.get_copy_of_buffer_as_string(),
        "\x1b[J\x1b[2K\r> ab"
    );

    stdout_mock.clear();
    assert!(line_buffer.move_backward());
    assert_eq!(
        stdout_mock.get_copy_of_buffer_as_string(),
        "\x1b[J\x1b[2K\r> ab\x08"
    );
}

#[test]
fn test_not_interactive_mutates_silently() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", false, 80);
    line_buffer.write(&chars("hello"));
    assert!(line_buffer.kill_word_front());
    line_buffer.refresh();
    line_buffer.clear_screen();
    line_buffer.set_style(0, 1, "1");
    assert_eq!(line_buffer.text(), "");
    assert_eq!(line_buffer.kill_slot(), chars("hello"));
    assert_eq!(stdout_mock.get_copy_of_buffer(), Vec::<u8>::new());
}

#[test]
fn test_set_interactive_redraws_when_turned_on() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", false, 80);
    line_buffer.write(&chars("x"));
    line_buffer.set_interactive(true);
    assert!(line_buffer.is_interactive());
    assert_eq!(
        stdout_mock.get_copy_of_buffer_as_string(),
        "\x1b[J\x1b[2K\r> x"
    );

    stdout_mock.clear();
    line_buffer.set_interactive(false);
    assert_eq!(stdout_mock.get_copy_of_buffer(), Vec::<u8>::new());
}

#[test]
fn test_yank_with_empty_slot_does_not_redraw() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", true, 80);
    assert!(!line_buffer.yank());
    assert_eq!(stdout_mock.get_copy_of_buffer(), Vec::<u8>::new());
}

#[test]
fn test_kill_yank_round_trip_through_buffer() {
    let (line_buffer, _) = new_line_buffer("> ", true, 80);
    line_buffer.set(6, chars("hello world"));
    assert!(line_buffer.kill());
    assert_eq!(line_buffer.text(), "hello ");
    assert!(line_buffer.yank());
    assert_eq!(line_buffer.text_and_cursor(), ("hello world".to_string(), 11));
}

#[test]
fn test_set_text_moves_cursor_to_end() {
    let (line_buffer, _) = new_line_buffer("> ", true, 80);
    line_buffer.set_text(chars("recall"));
    assert_eq!(line_buffer.cursor(), 6);
    assert!(line_buffer.is_cursor_at_end());
}

#[test]
fn test_restore_without_backup_is_redraw_only() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", true, 80);
    line_buffer.set_text(chars("abc"));
    stdout_mock.clear();
    line_buffer.restore();
    assert_eq!(line_buffer.text(), "abc");
    assert_eq!(
        stdout_mock.get_copy_of_buffer_as_string(),
        "\x1b[J\x1b[2K\r> abc"
    );
}

#[test]
fn test_clean_then_refresh_pairs_up() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", true, 80);
    line_buffer.clean();
    line_buffer.clean();
    line_buffer.refresh();
    assert_eq!(
        stdout_mock.get_copy_of_buffer_as_string(),
        "\x1b[J\x1b[2K\r> "
    );
}

#[test]
fn test_clear_screen_goes_home_first() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", true, 80);
    line_buffer.clear_screen();
    assert!(
        stdout_mock
            .get_copy_of_buffer_as_string()
            .starts_with("\x1b[H\x1b[J")
    );
}

#[test]
fn test_print_above_keeps_prompt_below() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", true, 80);
    line_buffer.insert(&chars("ls"));
    stdout_mock.clear();
    line_buffer.print_above(b"done\r\n").unwrap();
    assert_eq!(
        stdout_mock.get_copy_of_buffer_as_string(),
        "\x1b[J\x1b[2K\rdone\r\n> ls"
    );
}

#[test]
fn test_set_style_returns_to_cursor() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", true, 80);
    line_buffer.set(1, chars("abcd"));
    stdout_mock.clear();

    line_buffer.set_style(2, 3, "31");
    assert_eq!(
        stdout_mock.get_copy_of_buffer_as_string(),
        "b\x1b[31mc\x1b[0m\x08\x08"
    );
    assert_eq!(line_buffer.text(), "abcd");

    stdout_mock.clear();
    line_buffer.set_style(0, 99, "1");
    assert_eq!(
        stdout_mock.get_copy_of_buffer_as_string(),
        "\x08\x1b[1mabcd\x1b[0m\x08\x08\x08"
    );
}

#[test]
fn test_set_style_expands_tabs() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", true, 80);
    line_buffer.set(0, chars("a\tb"));
    stdout_mock.clear();

    line_buffer.set_style(0, 2, "1");
    assert_eq!(
        stdout_mock.get_copy_of_buffer_as_string(),
        "\x1b[1ma    \x1b[0m\x08\x08\x08\x08\x08"
    );
    assert!(!stdout_mock.get_copy_of_buffer_as_string().contains('\t'));
}

#[test]
#[should_panic(expected = "set_style")]
fn test_set_style_reversed_range_panics() {
    let (line_buffer, _) = new_line_buffer("> ", true, 80);
    line_buffer.set_style(3, 1, "1");
}

#[test]
fn test_geometry_queries() {
    let (line_buffer, _) = new_line_buffer("> ", true, 5);
    assert_eq!(line_buffer.line_count(), 1);
    line_buffer.set(2, chars("abcdef"));
    assert_eq!(line_buffer.prompt_width(), 2);
    assert_eq!(line_buffer.display_width(), 6);
    assert_eq!(line_buffer.line_count(), 2);
    assert_eq!(line_buffer.idx_line(), 0);
    assert_eq!(line_buffer.cursor_line_count(), 2);
    line_buffer.move_line_end();
    assert_eq!(line_buffer.idx_line(), 1);
    assert_eq!(line_buffer.cursor_line_count(), 1);
    assert_eq!(line_buffer.width_at(Some(0), -3), 0);
    assert_eq!(line_buffer.width_at(None, -3), 3);
}

#[test]
fn test_line_count_zero_when_nothing_to_show() {
    let (line_buffer, _) = new_line_buffer("", true, 80);
    assert_eq!(line_buffer.line_count(), 0);
    assert_eq!(line_buffer.cursor_line_count(), 0);
}

#[test]
fn test_set_prompt_and_mask() {
    let (line_buffer, stdout_mock) = new_line_buffer("> ", true, 80);
    line_buffer.set_prompt("\x1b[32mpassword:\x1b[0m ");
    assert_eq!(line_buffer.prompt_width(), 10);
    line_buffer.set_mask(Some('*'));
    assert_eq!(line_buffer.mask(), Some('*'));
    stdout_mock.clear();
    line_buffer.insert(&chars("pw"));
    assert_eq!(
        stdout_mock.get_copy_of_buffer_as_string(),
        "\x1b[J\x1b[2K\r\x1b[32mpassword:\x1b[0m **"
    );
}

#[test]
fn test_concurrent_queries_agree_with_each_other() {
    let (line_buffer, _) = new_line_buffer("> ", true, 20);
    let line_buffer = Arc::new(line_buffer);

    let writer = {
        let line_buffer = line_buffer.clone();
        thread::spawn(move || {
            for i in 0..500 {
                if i % 50 == 49 {
                    line_buffer.erase();
                } else {
                    line_buffer.insert(&['x', 'y']);
                    line_buffer.backspace();
                }
            }
        })
    };

    for _ in 0..500 {
        let snapshot = line_buffer.snapshot();
        assert!(snapshot.cursor <= snapshot.text.len());
        let (text, cursor) = line_buffer.text_and_cursor();
        assert!(cursor <= text.chars().count());
        assert!(text.chars().all(|it| it == 'x' || it == 'y'));
    }

    writer.join().unwrap();
    let snapshot = line_buffer.snapshot();
    assert_eq!(snapshot.text.len(), line_buffer.len());
    assert_eq!(line_buffer.to_bytes().len(), line_buffer.len());
}

use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::io::AsRawFd;

use log::debug;
use mio::unix::SourceFd;
use mio::{Events, Interest, Poll, Token};
use reservation_table::{parse_record, HashTable, Reservation};

use crate::event_loop::EventLoop;

pub struct TerminalEventLoop;

const STDIN_TOKEN: Token = Token(0);

impl EventLoop for TerminalEventLoop {
    fn run(&mut self, table: &mut HashTable<Reservation>) -> io::Result<()> {
        let mut poll = Poll::new()?;
        let mut events = Events::with_capacity(128);

        let fd = io::stdin().as_raw_fd();
        let mut stdin_fd = SourceFd(&fd);
        let mut reader = BufReader::new(io::stdin());
        match poll.registry().register(&mut stdin_fd, STDIN_TOKEN, Interest::READABLE) {
            Ok(()) => (),
            // epoll refuses regular files, e.g. stdin redirected from a script
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                debug!("stdin cannot be polled ({}), reading it line by line", e);
                prompt()?;
                return run_blocking(reader, table);
            }
            Err(e) => return Err(e),
        }

        let mut buffer = String::new();
        prompt()?;

        loop {
            match poll.poll(&mut events, None) {
                Ok(_) => (),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }

            for event in events.iter() {
                if event.token() != STDIN_TOKEN {
                    continue;
                }
                // Drain every complete line already sitting in the reader's buffer,
                // the fd will not report them as readable again
                loop {
                    buffer.clear();
                    match reader.read_line(&mut buffer) {
                        Ok(0) => {
                            println!("\nInput stream closed. Exiting.");
                            return Ok(());
                        }
                        Ok(_) => {
                            if handle_line(&buffer, table) {
                                return Ok(());
                            }
                            prompt()?;
                        }
                        Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                        Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                        Err(e) => return Err(e),
                    }
                    if reader.buffer().is_empty() {
                        break;
                    }
                }
            }
        }
    }
}

/// Reads commands until exit or end of input without polling
fn run_blocking<R: BufRead>(mut reader: R, table: &mut HashTable<Reservation>) -> io::Result<()> {
    let mut buffer = String::new();
    loop {
        buffer.clear();
        match reader.read_line(&mut buffer) {
            Ok(0) => {
                println!("\nInput stream closed. Exiting.");
                return Ok(());
            }
            Ok(_) => {
                if handle_line(&buffer, table) {
                    return Ok(());
                }
                prompt()?;
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

// Returns true if the line was an exit command
fn handle_line(line: &str, table: &mut HashTable<Reservation>) -> bool {
    let input = line.trim();
    if input.is_empty() {
        return false;
    }
    debug!("handling command: {}", input);
    handle_command(input, table)
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

// Returns true if the command was to exit
fn handle_command(input: &str, table: &mut HashTable<Reservation>) -> bool {
    let (command, rest) = match input.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (input, ""),
    };

    match command.to_lowercase().as_str() {
        "exit" | "quit" => {
            println!("Goodbye!");
            return true;
        }
        "help" => show_help(),
        "display" => print!("{}", table),
        "size" => {
            println!(
                "{} reservations, {} buckets, load factor {:.2}",
                table.len(),
                table.num_buckets(),
                table.load_factor()
            );
        }
        "put" => {
            if rest.is_empty() {
                println!("Usage: put <code>,<hotel>,<room>,<checkin>,<checkout>");
            } else {
                handle_put(table, rest);
            }
        }
        "get" => match single_key(rest) {
            Some(code) => handle_get(table, code),
            None => println!("Usage: get <code>"),
        },
        "remove" => match single_key(rest) {
            Some(code) => handle_remove(table, code),
            None => println!("Usage: remove <code>"),
        },
        _ => {
            println!("Unknown command: {}. Type 'help' for available commands.", command);
        }
    }
    false
}

fn single_key(rest: &str) -> Option<&str> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(code), None) => Some(code),
        _ => None,
    }
}

fn show_help() {
    println!("Available commands:");
    println!("  put <code>,<hotel>,<room>,<checkin>,<checkout>  - Insert or replace a reservation");
    println!("  get <code>                                      - Show a reservation");
    println!("  remove <code>                                   - Remove a reservation");
    println!("  display                                         - Dump every bucket");
    println!("  size                                            - Show entry and bucket counts");
    println!("  help                                            - Show this help message");
    println!("  exit                                            - Exit the program");
}

fn handle_put(table: &mut HashTable<Reservation>, record: &str) {
    match parse_record(record) {
        Ok(Some((code, reservation))) => {
            let bucket = table.bucket_of(&code);
            match table.put(&code, reservation) {
                Some(_) => println!("✓ Replaced {} (bucket {})", code, bucket),
                None => println!("✓ Inserted {} (bucket {})", code, bucket),
            }
        }
        Ok(None) => println!("✗ Expected 5 comma-separated fields"),
        Err(e) => println!("✗ {}", e),
    }
}

fn handle_get(table: &HashTable<Reservation>, code: &str) {
    match table.get(code) {
        Some(reservation) => println!("✓ {}: {}", code, reservation),
        None => println!("✗ Reservation '{}' not found", code),
    }
}

fn handle_remove(table: &mut HashTable<Reservation>, code: &str) {
    match table.remove(code) {
        Some(reservation) => println!("✓ Removed {}: {}", code, reservation),
        None => println!("✗ Reservation '{}' not found", code),
    }
}

pub mod terminal_event_loop;

use std::io;

use reservation_table::{HashTable, Reservation};

pub trait EventLoop {
    fn run(&mut self, table: &mut HashTable<Reservation>) -> io::Result<()>;
}

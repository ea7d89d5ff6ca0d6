//! Hand-off seam between the scroller and the hardware transfer mechanism.
//!
//! The scroller computes which plane tile-buffer cells change and in what
//! order; something outside this crate performs the writes. That seam is
//! the [`TransferQueue`] trait, with [`CommandQueue`] as the bounded
//! single-producer single-consumer implementation: the render step feeds
//! the producer half, a vertical-blank task drains the consumer half into
//! the hardware. The scroll offset travels through the same FIFO after the
//! frame's tile writes, so it cannot take visual effect before they have
//! drained.

use heapless::spsc::{Consumer, Producer, Queue};

use crate::plane::Plane;
use crate::tile::TileAttr;

/// Destination for the tile writes and scroll updates one scroll step
/// produces.
pub trait TransferQueue {
    /// Queue one tile attribute write at a plane tile-buffer address.
    fn push_tile(&mut self, plane: Plane, addr: u16, attr: TileAttr);
    /// Queue the pixel scroll offset, applied at the next vertical blank
    /// once preceding writes have drained.
    fn set_scroll(&mut self, plane: Plane, x: i32, y: i32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferCommand {
    Tile {
        plane: Plane,
        addr: u16,
        attr: TileAttr,
    },
    Scroll {
        plane: Plane,
        x: i32,
        y: i32,
    },
}

/// Bounded transfer command queue holding up to `N - 1` commands.
pub struct CommandQueue<const N: usize> {
    queue: Queue<TransferCommand, N>,
}

impl<const N: usize> CommandQueue<N> {
    pub const fn new() -> CommandQueue<N> {
        CommandQueue {
            queue: Queue::new(),
        }
    }

    pub fn split(&mut self) -> (CommandSink<'_, N>, CommandDrain<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (
            CommandSink {
                producer,
                dropped: 0,
            },
            CommandDrain { consumer },
        )
    }
}

impl<const N: usize> Default for CommandQueue<N> {
    fn default() -> CommandQueue<N> {
        CommandQueue::new()
    }
}

/// Producer half; saturation drops commands and counts them instead of
/// blocking the render step.
pub struct CommandSink<'a, const N: usize> {
    producer: Producer<'a, TransferCommand, N>,
    dropped: u32,
}

impl<'a, const N: usize> CommandSink<'a, N> {
    fn push(&mut self, command: TransferCommand) {
        if self.producer.enqueue(command).is_err() {
            self.dropped += 1;
        }
    }

    /// Commands discarded because the queue was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

impl<'a, const N: usize> TransferQueue for CommandSink<'a, N> {
    fn push_tile(&mut self, plane: Plane, addr: u16, attr: TileAttr) {
        self.push(TransferCommand::Tile { plane, addr, attr });
    }

    fn set_scroll(&mut self, plane: Plane, x: i32, y: i32) {
        self.push(TransferCommand::Scroll { plane, x, y });
    }
}

/// Consumer half, drained from the vertical-blank task.
pub struct CommandDrain<'a, const N: usize> {
    consumer: Consumer<'a, TransferCommand, N>,
}

impl<'a, const N: usize> CommandDrain<'a, N> {
    pub fn pop(&mut self) -> Option<TransferCommand> {
        self.consumer.dequeue()
    }

    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[test]
    fn commands_drain_in_fifo_order() {
        let mut queue: CommandQueue<16> = CommandQueue::new();
        let (mut sink, mut drain) = queue.split();
        sink.push_tile(Plane::A, 3, TileAttr(7));
        sink.push_tile(Plane::A, 4, TileAttr(8));
        sink.set_scroll(Plane::A, 16, 0);

        let mut drained = Vec::new();
        while let Some(command) = drain.pop() {
            drained.push(command);
        }
        assert_eq!(
            drained,
            [
                TransferCommand::Tile {
                    plane: Plane::A,
                    addr: 3,
                    attr: TileAttr(7)
                },
                TransferCommand::Tile {
                    plane: Plane::A,
                    addr: 4,
                    attr: TileAttr(8)
                },
                TransferCommand::Scroll {
                    plane: Plane::A,
                    x: 16,
                    y: 0
                },
            ]
        );
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn saturation_drops_and_counts() {
        let mut queue: CommandQueue<4> = CommandQueue::new();
        let (mut sink, mut drain) = queue.split();
        for addr in 0..5u16 {
            sink.push_tile(Plane::B, addr, TileAttr(addr));
        }
        assert_eq!(sink.dropped(), 2);

        let mut kept = 0;
        while drain.pop().is_some() {
            kept += 1;
        }
        assert_eq!(kept, 3);
    }
}

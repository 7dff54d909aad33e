//! Live control channel.
//!
//! A lock-free single-producer/single-consumer queue carrying note and
//! parameter commands from a control thread into the engine. The engine
//! drains it at the start of every buffer.

use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use pp_ir::VoiceParams;

use crate::params::{clamp_params, AMPLITUDE, PAN};
use crate::voice::VoiceTag;

/// Command sent to the engine from outside the audio thread.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlCommand {
    /// Start a voice tagged with `id`.
    NoteOn { id: VoiceTag, params: VoiceParams },
    /// Release every voice tagged with `id`.
    NoteOff { id: VoiceTag },
    SetPan { id: VoiceTag, pan: f32 },
    SetAmplitude { id: VoiceTag, amplitude: f32 },
    /// Release every sounding voice.
    ReleaseAll,
}

/// Producer half, owned by the control thread.
pub struct ControlSender {
    producer: HeapProd<ControlCommand>,
}

/// Consumer half, owned by the engine.
pub struct ControlReceiver {
    consumer: HeapCons<ControlCommand>,
}

/// Create a channel holding up to `capacity` pending commands.
pub fn control_channel(capacity: usize) -> (ControlSender, ControlReceiver) {
    let rb = HeapRb::<ControlCommand>::new(capacity.max(1));
    let (producer, consumer) = rb.split();
    (ControlSender { producer }, ControlReceiver { consumer })
}

impl ControlSender {
    /// Queue a command. Gives the command back if the queue is full.
    pub fn send(&mut self, command: ControlCommand) -> Result<(), ControlCommand> {
        self.producer.try_push(command)
    }

    /// Start a note, clamping parameters to their documented ranges.
    pub fn note_on(&mut self, id: VoiceTag, params: VoiceParams) -> Result<(), ControlCommand> {
        self.send(ControlCommand::NoteOn { id, params: clamp_params(params) })
    }

    pub fn note_off(&mut self, id: VoiceTag) -> Result<(), ControlCommand> {
        self.send(ControlCommand::NoteOff { id })
    }

    pub fn set_pan(&mut self, id: VoiceTag, pan: f32) -> Result<(), ControlCommand> {
        self.send(ControlCommand::SetPan { id, pan: PAN.clamp(pan) })
    }

    pub fn set_amplitude(&mut self, id: VoiceTag, amplitude: f32) -> Result<(), ControlCommand> {
        self.send(ControlCommand::SetAmplitude { id, amplitude: AMPLITUDE.clamp(amplitude) })
    }

    pub fn release_all(&mut self) -> Result<(), ControlCommand> {
        self.send(ControlCommand::ReleaseAll)
    }
}

impl ControlReceiver {
    /// Take the next pending command.
    pub fn try_recv(&mut self) -> Option<ControlCommand> {
        self.consumer.try_pop()
    }
}

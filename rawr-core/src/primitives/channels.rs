// Channels, publish/subscribe topics and named stacks
//
// `<-` and `->` dispatch on the kind of identifier on top of the stack:
//   #channel  rendezvous; the first side to arrive parks until the other comes
//   @stack    shared stack; a push runs the stack's triggers before the pusher
//             continues
//   $pubsub   broadcast; every subscriber gets its own context and a copy
//             of the value (write only)

use std::rc::Rc;

use tracing::{debug, trace};

use crate::channel::{Channel, Exchange};
use crate::context::{Context, Continuation};
use crate::interpreter::Interpreter;
use crate::named_stack::NamedStack;
use crate::pubsub::PubSub;
use crate::render::render_element;
use crate::value::{Callable, RuntimeError, Step, Value};

fn rendezvous(interp: &mut Interpreter, exchange: Exchange, name: &str) -> Step {
    match exchange {
        Exchange::Matched { current, partner } => {
            interp.schedule(partner);
            Ok(Some(current))
        }
        Exchange::Parked => {
            debug!(channel = name, "context parked");
            Ok(None)
        }
    }
}

fn channel_mut<'a>(interp: &'a mut Interpreter, name: &str) -> Result<&'a mut Channel, RuntimeError> {
    interp
        .channels
        .get_mut(name)
        .ok_or_else(|| RuntimeError::ChannelNotFound(name.to_string()))
}

// Each trigger runs on its own one-value stack under the pusher's task.
// They are chained so the first registered runs first and the last one
// returns to the pusher.
fn chain_triggers(interp: &mut Interpreter, pusher: Context, value: &Value, triggers: &[Callable]) -> Context {
    let task = pusher.task;
    let mut next = pusher;
    for trigger in triggers.iter().rev() {
        let mut ctx = interp.detached_context(&next, vec![value.clone()], trigger, task);
        ctx.continuations.insert(0, Continuation::ReturnTo(Box::new(next)));
        next = ctx;
    }
    next
}

// Write: ( value target -- )
pub fn send_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let target = ctx.pop_with_context("'<-' requires a value and a target (e.g., '42 #jobs <-')")?;
    match &target {
        Value::Channel(name) => {
            let exchange = channel_mut(interp, name)?.write(ctx)?;
            rendezvous(interp, exchange, name)
        }
        Value::Stack(name) => {
            let value = ctx.pop_with_context(&format!("'<-' on {name} requires a value to push"))?;
            let triggers = interp
                .stacks
                .get_mut(name)
                .ok_or_else(|| RuntimeError::StackNotFound(name.to_string()))?
                .push(value.clone());
            Ok(Some(chain_triggers(interp, ctx, &value, &triggers)))
        }
        Value::PubSub(name) => {
            let value = ctx.pop_with_context(&format!("'<-' on {name} requires a value to publish"))?;
            let subscribers = interp
                .pubsubs
                .get(name)
                .ok_or_else(|| RuntimeError::PubSubNotFound(name.to_string()))?
                .subscribers();
            for subscriber in &subscribers {
                let task = interp.next_task_id();
                let delivery = interp.detached_context(&ctx, vec![value.clone()], &subscriber.callable, task);
                interp.schedule(delivery);
            }
            trace!(pubsub = %name, deliveries = subscribers.len(), "published");
            Ok(Some(ctx))
        }
        other => Err(RuntimeError::InvalidTokenForWrite(render_element(other))),
    }
}

// Read: ( source -- value ), null when a named stack is empty
pub fn receive_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let source = ctx.pop_with_context("'->' requires a source (e.g., '#jobs ->')")?;
    match &source {
        Value::Channel(name) => {
            let exchange = channel_mut(interp, name)?.read(ctx)?;
            rendezvous(interp, exchange, name)
        }
        Value::Stack(name) => {
            let value = interp
                .stacks
                .get_mut(name)
                .ok_or_else(|| RuntimeError::StackNotFound(name.to_string()))?
                .pop()
                .unwrap_or(Value::Null);
            ctx.push(value);
            Ok(Some(ctx))
        }
        other => Err(RuntimeError::InvalidTokenForRead(render_element(other))),
    }
}

fn pop_channel_name(ctx: &Context, word: &str) -> Result<Rc<str>, RuntimeError> {
    let value = ctx.pop_with_context(&format!("'{word}' requires a channel (e.g., '#jobs {word}')"))?;
    match &value {
        Value::Channel(name) => Ok(Rc::clone(name)),
        other => Err(RuntimeError::TypeError(format!(
            "'{word}' expected channel, got {}",
            other.type_name()
        ))),
    }
}

fn pop_stack_name(ctx: &Context, word: &str) -> Result<Rc<str>, RuntimeError> {
    let value = ctx.pop_with_context(&format!("'{word}' requires a named stack (e.g., '@jobs {word}')"))?;
    match &value {
        Value::Stack(name) => Ok(Rc::clone(name)),
        other => Err(RuntimeError::TypeError(format!(
            "'{word}' expected stack, got {}",
            other.type_name()
        ))),
    }
}

fn pop_pubsub_name(ctx: &Context, word: &str) -> Result<Rc<str>, RuntimeError> {
    let value = ctx.pop_with_context(&format!("'{word}' requires a pubsub (e.g., '$news {word}')"))?;
    match &value {
        Value::PubSub(name) => Ok(Rc::clone(name)),
        other => Err(RuntimeError::TypeError(format!(
            "'{word}' expected pubsub, got {}",
            other.type_name()
        ))),
    }
}

// ---- channels ----

// Replaces any existing channel of the same name
pub fn create_channel_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let name = pop_channel_name(&ctx, "create_channel")?;
    debug!(channel = %name, "channel created");
    interp.channels.insert(Rc::clone(&name), Channel::new(name));
    Ok(Some(ctx))
}

// ( #ch -- bool ), whether a writer is waiting, so a reader can avoid parking
pub fn check_writers_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let name = pop_channel_name(&ctx, "?>")?;
    let waiting = channel_mut(interp, &name)?.has_waiting_writer();
    ctx.push(Value::Boolean(waiting));
    Ok(Some(ctx))
}

// Drops every parked reader and writer and removes the channel
pub fn stop_channel_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let name = pop_channel_name(&ctx, "stop_channel")?;
    let mut channel = interp
        .channels
        .remove(&name)
        .ok_or_else(|| RuntimeError::ChannelNotFound(name.to_string()))?;
    let parked = channel.clear();
    debug!(channel = %name, parked, "channel stopped");
    Ok(Some(ctx))
}

// ---- pubsub ----

pub fn create_pubsub_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let name = pop_pubsub_name(&ctx, "create_pubsub")?;
    debug!(pubsub = %name, "pubsub created");
    interp.pubsubs.insert(Rc::clone(&name), PubSub::new(name));
    Ok(Some(ctx))
}

// Subscribe: ( $topic [handler] subName -- ), subName may be null
pub fn subscribe_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let sub_name = match &ctx.pop_with_context("'subscribe' requires $topic [handler] name")? {
        Value::Null => None,
        Value::String(s) => Some(Rc::clone(s)),
        other => Some(Rc::from(other.to_plain_string())),
    };
    let handler = ctx.pop_callable("'subscribe' requires a handler quotation")?;
    let name = pop_pubsub_name(&ctx, "subscribe")?;
    interp
        .pubsubs
        .get_mut(&name)
        .ok_or_else(|| RuntimeError::PubSubNotFound(name.to_string()))?
        .subscribe(sub_name, handler);
    Ok(Some(ctx))
}

pub fn delete_pubsub_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let name = pop_pubsub_name(&ctx, "delete_pubsub")?;
    interp
        .pubsubs
        .remove(&name)
        .ok_or_else(|| RuntimeError::PubSubNotFound(name.to_string()))?;
    debug!(pubsub = %name, "pubsub deleted");
    Ok(Some(ctx))
}

// ---- named stacks ----

pub fn create_stack_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let name = pop_stack_name(&ctx, "create_stack")?;
    debug!(stack = %name, "named stack created");
    interp.stacks.insert(Rc::clone(&name), NamedStack::new(name));
    Ok(Some(ctx))
}

// Create trigger: ( @stack [trigger] -- )
pub fn create_trigger_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let trigger = ctx.pop_callable("'create_trigger' requires @stack [trigger]")?;
    let name = pop_stack_name(&ctx, "create_trigger")?;
    interp
        .stacks
        .get_mut(&name)
        .ok_or_else(|| RuntimeError::StackNotFound(name.to_string()))?
        .add_trigger(trigger);
    Ok(Some(ctx))
}

pub fn delete_stack_builtin(interp: &mut Interpreter, ctx: Context) -> Step {
    let name = pop_stack_name(&ctx, "delete_stack")?;
    interp
        .stacks
        .remove(&name)
        .ok_or_else(|| RuntimeError::StackNotFound(name.to_string()))?;
    debug!(stack = %name, "named stack deleted");
    Ok(Some(ctx))
}

//! Identifier types for the task domain.

use crate::macros::uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a task record.
    TaskId
);

uuid_identifier!(
    /// Unique identifier for a task type.
    TaskTypeId
);

uuid_identifier!(
    /// Unique identifier for a derived-task edge.
    DerivedTaskId
);

uuid_identifier!(
    /// Unique identifier for a document produced by a task.
    DocumentId
);

uuid_identifier!(
    /// Identifier of the actor owning a record.
    ///
    /// Actors are either human users (uploads) or bots such as a registered
    /// enricher.
    ActorId
);
